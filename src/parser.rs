////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Parser values and fundamental operators.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::diagnostic;
use crate::label::LabelRepr;
use crate::result::Failure;
use crate::result::ParseError;
use crate::result::ParseResult;
use crate::source::Source;
use crate::trace::Outcome;
use crate::trace::Region;
use crate::trace::Trace;

// External library imports.
use tracing::span;
use tracing::Level;

// Standard library imports.
use std::ops::Add;
use std::ops::BitOr;
use std::ops::Mul;
use std::ops::Shl;
use std::ops::Shr;
use std::rc::Rc;


////////////////////////////////////////////////////////////////////////////////
// Context
////////////////////////////////////////////////////////////////////////////////
/// The state threaded through every parser invocation of a single parse
/// call: the backtracking input and the live activation tree. A `Context`
/// is private to one parse and dropped when it returns.
pub struct Context {
    pub(crate) source: Source,
    pub(crate) trace: Trace,
}

impl Context {
    /// Constructs a fresh `Context` over the given input.
    pub(crate) fn new(source: Source) -> Self {
        Context {
            source,
            trace: Trace::new(),
        }
    }

    /// Returns the current cursor offset.
    pub fn pos(&self) -> usize {
        self.source.pos()
    }

    /// Returns true if the cursor is at the end of the input.
    pub fn at_end(&mut self) -> bool {
        self.source.at_end()
    }

    /// Reads everything remaining, advancing the cursor to the end.
    pub fn read_all(&mut self) -> String {
        self.source.read_all()
    }

    /// Returns the unit under the cursor without advancing.
    pub fn peek_char(&mut self) -> Option<char> {
        self.source.peek_char()
    }

    /// Reads a single unit, advancing the cursor past it.
    pub fn next_char(&mut self) -> Option<char> {
        self.source.next_char()
    }
}


////////////////////////////////////////////////////////////////////////////////
// Parser
////////////////////////////////////////////////////////////////////////////////
/// A composable parser producing values of type `V`.
///
/// A parser pairs a label resembling the expression that constructed it
/// with a body run against a [`Context`]. Parsers are immutable once
/// constructed and may be reused across any number of parse calls; cloning
/// shares the body.
///
/// [`Context`]: struct.Context.html
pub struct Parser<V> {
    label: String,
    ignore: bool,
    splice_start: bool,
    splice_end: bool,
    body: Rc<dyn Fn(&mut Context) -> ParseResult<V>>,
}

impl<V> Clone for Parser<V> {
    fn clone(&self) -> Self {
        Parser {
            label: self.label.clone(),
            ignore: self.ignore,
            splice_start: self.splice_start,
            splice_end: self.splice_end,
            body: Rc::clone(&self.body),
        }
    }
}

impl<V> std::fmt::Debug for Parser<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("label", &self.label)
            .finish()
    }
}

impl<V> LabelRepr for Parser<V> {
    fn label_repr(&self) -> String {
        self.label.clone()
    }
}

impl<V: 'static> Parser<V> {
    /// Constructs a new `Parser` from a label and a body.
    ///
    /// The body signals failure by returning a [`Failure`] for the current
    /// position; it never needs to restore the cursor, which is rewound to
    /// the invocation's entry whenever the body fails.
    ///
    /// [`Failure`]: struct.Failure.html
    pub fn new<L, F>(label: L, body: F) -> Self
        where
            L: Into<String>,
            F: Fn(&mut Context) -> ParseResult<V> + 'static,
    {
        Parser {
            label: label.into(),
            ignore: false,
            splice_start: false,
            splice_end: false,
            body: Rc::new(body),
        }
    }

    /// Returns the parser's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the parser with its label replaced; the body is preserved.
    pub fn with_label<L>(mut self, label: L) -> Self
        where L: Into<String>
    {
        self.label = label.into();
        self
    }

    /// Returns the parser with its activations omitted from rendered
    /// diagnostics; their children are promoted to the enclosing node.
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Marks the parser as a splice-region start boundary.
    pub(crate) fn splice_start(mut self) -> Self {
        self.splice_start = true;
        self
    }

    /// Marks the parser as a splice-region end boundary.
    pub(crate) fn splice_end(mut self) -> Self {
        self.splice_end = true;
        self
    }

    /// Runs the parser within the given context, recording its activation.
    ///
    /// On failure the cursor is restored to the invocation's entry offset
    /// before the activation closes, so a failed parser never leaves any
    /// effect on the input.
    pub(crate) fn run(&self, ctx: &mut Context) -> ParseResult<V> {
        let entry = ctx.source.pos();
        let id = ctx.trace.enter(
            self.label.clone(),
            entry,
            self.ignore,
            self.splice_end);
        if self.splice_start { ctx.trace.push_region(Region::Splice); }
        if self.splice_end { ctx.trace.push_region(Region::Keep); }

        let result = (self.body)(ctx);

        if self.splice_end { ctx.trace.pop_region(); }
        if self.splice_start { ctx.trace.pop_region(); }

        match &result {
            Ok(_) => {
                let end = ctx.source.pos();
                ctx.trace.exit(id, end, Outcome::Success);
            },
            Err(_) => {
                ctx.source.restore_to(entry);
                ctx.trace.exit(id, entry, Outcome::Failure);
            },
        }
        result
    }

    /// Parses the given input to completion.
    ///
    /// On success returns the parsed value with the cursor having consumed
    /// exactly the units the grammar accepted; on failure returns a
    /// [`ParseError`] carrying the rendered diagnostic and the failure
    /// position.
    ///
    /// [`ParseError`]: struct.ParseError.html
    pub fn parse<S>(&self, source: S) -> Result<V, ParseError>
        where S: Into<Source>
    {
        let _span = span!(Level::DEBUG, "parse").entered();

        let mut ctx = Context::new(source.into());
        match self.run(&mut ctx) {
            Ok(value) => Ok(value),
            Err(failure) => {
                ctx.source.fill_through_line(failure.at);
                Err(diagnostic::render(&ctx, &failure))
            },
        }
    }

    /// Applies the given closure to the parsed value. Failures pass through
    /// untouched.
    pub fn map<U, F>(self, f: F) -> Parser<U>
        where
            U: 'static,
            F: Fn(V) -> U + 'static,
    {
        let label = self.label.clone();
        let inner = self;
        Parser::new(label, move |ctx| inner.run(ctx).map(|v| (f)(v)))
            .ignore()
    }

    /// Runs the parser, then the parser produced by applying the given
    /// closure to its value, at the position where the first left off.
    pub fn bind<U, F>(self, f: F) -> Parser<U>
        where
            U: 'static,
            F: Fn(V) -> Parser<U> + 'static,
    {
        let label = self.label.clone();
        let inner = self;
        Parser::new(label, move |ctx| {
            let value = inner.run(ctx)?;
            (f)(value).run(ctx)
        })
        .ignore()
    }

    /// Runs the parser, then `next`, returning `next`'s value.
    pub fn ignore_then<U>(self, next: Parser<U>) -> Parser<U>
        where U: 'static
    {
        let label = format!("({} > {})", self.label, next.label);
        let first = self;
        Parser::new(label, move |ctx| {
            let _ = first.run(ctx)?;
            next.run(ctx)
        })
    }

    /// Runs the parser, then `next`, returning this parser's value.
    pub fn then_ignore<U>(self, next: Parser<U>) -> Parser<V>
        where U: 'static
    {
        let label = format!("({} < {})", self.label, next.label);
        let first = self;
        Parser::new(label, move |ctx| {
            let value = first.run(ctx)?;
            let _ = next.run(ctx)?;
            Ok(value)
        })
    }

    /// Tries the parser; if it fails having consumed no input, tries
    /// `other` from the same position. A failure that consumed input
    /// propagates without trying `other`.
    pub fn or(self, other: Parser<V>) -> Parser<V> {
        let label = format!("({} | {})", self.label, other.label);
        let left = self;
        Parser::new(label, move |ctx| {
            let entry = ctx.source.pos();
            match left.run(ctx) {
                Ok(value) => Ok(value),
                Err(failure) if failure.at == entry => other.run(ctx),
                Err(failure) => Err(failure),
            }
        })
    }

    /// Runs the parser exactly `n` times in succession, returning every
    /// value in order.
    pub fn times(self, n: usize) -> Parser<Vec<V>> {
        let label = format!("({} * {})", self.label, n);
        let inner = self;
        Parser::new(label, move |ctx| {
            let mut values = Vec::with_capacity(n);
            for _ in 0..n {
                values.push(inner.run(ctx)?);
            }
            Ok(values)
        })
    }

    /// Runs the parser without committing any cursor movement; its value is
    /// returned and failures propagate.
    pub fn peek(self) -> Parser<V> {
        let label = format!("peek({})", self.label);
        let inner = self;
        Parser::new(label, move |ctx| {
            let entry = ctx.source.pos();
            let value = inner.run(ctx)?;
            ctx.source.restore_to(entry);
            Ok(value)
        })
    }

    /// Succeeds with this parser's value iff `probe` would fail at the
    /// current position; if `probe` succeeds, fails without consuming.
    pub fn failing<U>(self, probe: Parser<U>) -> Parser<V>
        where U: 'static
    {
        let label = format!("{}.failing({})", self.label, probe.label);
        let expected = label.clone();
        let inner = self;
        Parser::new(label, move |ctx| {
            let entry = ctx.source.pos();
            match probe.run(ctx) {
                Ok(_) => {
                    ctx.source.restore_to(entry);
                    Err(Failure::new(entry, expected.clone()))
                },
                Err(_) => inner.run(ctx),
            }
        })
    }
}


////////////////////////////////////////////////////////////////////////////////
// Operator sugar.
////////////////////////////////////////////////////////////////////////////////

/// `a | b` tries `a`, then `b` when `a` fails without consuming.
impl<V: 'static> BitOr for Parser<V> {
    type Output = Parser<V>;

    fn bitor(self, rhs: Parser<V>) -> Self::Output {
        self.or(rhs)
    }
}

/// `a >> b` runs both in order and keeps `b`'s value.
impl<V: 'static, U: 'static> Shr<Parser<U>> for Parser<V> {
    type Output = Parser<U>;

    fn shr(self, rhs: Parser<U>) -> Self::Output {
        self.ignore_then(rhs)
    }
}

/// `a << b` runs both in order and keeps `a`'s value.
impl<V: 'static, U: 'static> Shl<Parser<U>> for Parser<V> {
    type Output = Parser<V>;

    fn shl(self, rhs: Parser<U>) -> Self::Output {
        self.then_ignore(rhs)
    }
}

/// `p * n` runs `p` exactly `n` times, collecting the values.
impl<V: 'static> Mul<usize> for Parser<V> {
    type Output = Parser<Vec<V>>;

    fn mul(self, rhs: usize) -> Self::Output {
        self.times(rhs)
    }
}

/// `a + b` runs both in order and concatenates their sequence values.
impl<V: 'static> Add for Parser<Vec<V>> {
    type Output = Parser<Vec<V>>;

    fn add(self, rhs: Parser<Vec<V>>) -> Self::Output {
        let label = format!("({} + {})", self.label, rhs.label);
        let first = self;
        Parser::new(label, move |ctx| {
            let mut values = first.run(ctx)?;
            values.extend(rhs.run(ctx)?);
            Ok(values)
        })
    }
}
