////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Parser results.
////////////////////////////////////////////////////////////////////////////////

// Standard library imports.
use std::borrow::Cow;


////////////////////////////////////////////////////////////////////////////////
// ParseResult
////////////////////////////////////////////////////////////////////////////////
/// The result of a parse attempt.
pub type ParseResult<V> = Result<V, Failure>;


////////////////////////////////////////////////////////////////////////////////
// Failure
////////////////////////////////////////////////////////////////////////////////
/// An unmet expectation, propagated upward through the parsers enclosing it.
///
/// The failure records the cursor offset at the instant the expectation
/// failed, before any restoration. Alternation consults this offset to
/// decide whether the failing branch consumed input: a branch whose failure
/// offset equals its entry offset consumed nothing and may be retried.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Failure {
    /// The cursor offset at the moment the expectation failed.
    pub at: usize,
    /// The label of the failing parser.
    pub expected: Cow<'static, str>,
}

impl Failure {
    /// Constructs a new `Failure` for the given offset and expectation.
    pub fn new<E>(at: usize, expected: E) -> Self
        where E: Into<Cow<'static, str>>
    {
        Failure {
            at,
            expected: expected.into(),
        }
    }

    /// Returns a copy of the failure with its offset collapsed to the given
    /// entry position, so enclosing alternations treat it as consuming
    /// nothing.
    pub fn uncommitted(mut self, entry: usize) -> Self {
        self.at = entry;
        self
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error: expected {}", self.expected)
    }
}

impl std::error::Error for Failure {}


////////////////////////////////////////////////////////////////////////////////
// ParseError
////////////////////////////////////////////////////////////////////////////////
/// A failed parse, as surfaced by the top-level parse entry.
///
/// Carries the rendered multi-line diagnostic along with the failure
/// position. The diagnostic is the canonical way to understand a failure;
/// `Display` emits it verbatim.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The label of the deepest failing parser.
    pub expected: Cow<'static, str>,
    /// The offset of the failure.
    pub at: usize,
    /// The 1-based line number of the failure.
    pub line: usize,
    /// The 0-based column of the failure within its line.
    pub column: usize,
    /// The rendered diagnostic block.
    pub diagnostic: String,
}

impl ParseError {
    /// Returns the rendered diagnostic block.
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

impl std::error::Error for ParseError {}
