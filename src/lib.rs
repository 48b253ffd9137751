////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Scoria parser combinator library.
//!
//! A grammar is declared by composing small parsers into larger ones;
//! running the result against an input yields either a parsed value or an
//! error rendering the tree of parser activations around the failure.
//!
//! ```
//! use scoria::*;
//!
//! let record = sep_by(decimal(), literal(","));
//! assert_eq!(record.parse("1,2,3").ok(), Some(vec![1, 2, 3]));
//! ```
////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs)]

// Internal modules.
mod combinator;
mod diagnostic;
mod label;
mod parser;
mod primitive;
mod result;
mod source;
mod trace;

// Exports.
pub use self::combinator::*;
pub use self::label::*;
pub use self::parser::*;
pub use self::primitive::*;
pub use self::result::*;
pub use self::source::*;
