////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Parser combinators.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::label::label_call;
use crate::label::LabelRepr;
use crate::parser::Context;
use crate::parser::Parser;
use crate::result::Failure;
use crate::result::ParseResult;
use crate::primitive::whitespace;

// External library imports.
use once_cell::unsync::OnceCell;

// Standard library imports.
use std::rc::Rc;


////////////////////////////////////////////////////////////////////////////////
// Parser combinators.
////////////////////////////////////////////////////////////////////////////////

/// Returns a parser which attempts a parse, wrapping the value in `Some` if
/// it succeeds. A failure that consumed nothing becomes `None`; a failure
/// that consumed input propagates.
pub fn optional<V>(parser: Parser<V>) -> Parser<Option<V>>
    where V: 'static
{
    let label = label_call("optional", [parser.label_repr()]);
    Parser::new(label, move |ctx| {
        let entry = ctx.pos();
        match parser.run(ctx) {
            Ok(value) => Ok(Some(value)),
            Err(failure) if failure.at == entry => Ok(None),
            Err(failure) => Err(failure),
        }
    })
}

/// Returns a parser which greedily repeats a parse zero or more times,
/// collecting the values. Never fails; the cursor rests after the last
/// successful repetition.
///
/// The end of input is checked before each attempt, and a repetition that
/// consumed nothing ends the loop, so the iteration count never exceeds
/// the remaining input length plus one.
pub fn many<V>(parser: Parser<V>) -> Parser<Vec<V>>
    where V: 'static
{
    let label = label_call("many", [parser.label_repr()]);
    Parser::new(label, move |ctx| {
        let mut values = Vec::new();
        loop {
            if ctx.at_end() { break; }
            let before = ctx.pos();
            match parser.run(ctx) {
                Ok(value) => {
                    values.push(value);
                    if ctx.pos() == before { break; }
                },
                Err(_) => break,
            }
        }
        Ok(values)
    })
}

/// Returns a parser which greedily repeats a parse, requiring at least one
/// repetition.
pub fn many_1<V>(parser: Parser<V>) -> Parser<Vec<V>>
    where V: 'static
{
    let label = label_call("many_1", [parser.label_repr()]);
    Parser::new(label, move |ctx| {
        let mut values = vec![parser.run(ctx)?];
        loop {
            if ctx.at_end() { break; }
            let before = ctx.pos();
            match parser.run(ctx) {
                Ok(value) => {
                    values.push(value);
                    if ctx.pos() == before { break; }
                },
                Err(_) => break,
            }
        }
        Ok(values)
    })
}

/// Returns a parser which parses a sequence of elements interleaved with a
/// separator, collecting the element values. The zero-length form never
/// fails.
pub fn sep_by<V, U>(parser: Parser<V>, sep: Parser<U>) -> Parser<Vec<V>>
    where
        V: 'static,
        U: 'static,
{
    let label = label_call("sep_by",
        [parser.label_repr(), sep.label_repr()]);
    let tail = many(sep.ignore_then(parser.clone()).ignore());
    Parser::new(label, move |ctx| {
        if ctx.at_end() { return Ok(Vec::new()); }
        let mut values = match parser.run(ctx) {
            Ok(value) => vec![value],
            Err(_) => return Ok(Vec::new()),
        };
        values.extend(tail.run(ctx)?);
        Ok(values)
    })
}

/// Returns a parser which parses a sequence of elements interleaved with a
/// separator, requiring at least one element.
pub fn sep_by_1<V, U>(parser: Parser<V>, sep: Parser<U>) -> Parser<Vec<V>>
    where
        V: 'static,
        U: 'static,
{
    let label = label_call("sep_by_1",
        [parser.label_repr(), sep.label_repr()]);
    let tail = many(sep.ignore_then(parser.clone()).ignore());
    Parser::new(label, move |ctx| {
        let mut values = vec![parser.run(ctx)?];
        values.extend(tail.run(ctx)?);
        Ok(values)
    })
}

/// Returns a parser which runs the given parsers in order, collecting their
/// values.
pub fn group<V>(parsers: Vec<Parser<V>>) -> Parser<Vec<V>>
    where V: 'static
{
    let label = label_call("group",
        parsers.iter().map(LabelRepr::label_repr).collect::<Vec<_>>());
    Parser::new(label, move |ctx| {
        let mut values = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            values.push(parser.run(ctx)?);
        }
        Ok(values)
    })
}

/// Returns a parser which wraps the parsed value in a one-element sequence.
pub fn single<V>(parser: Parser<V>) -> Parser<Vec<V>>
    where V: 'static
{
    let label = label_call("single", [parser.label_repr()]);
    Parser::new(label, move |ctx| Ok(vec![parser.run(ctx)?]))
}

/// Returns a parser which parses `parser` delimited by `left` and `right`,
/// returning the inner value.
pub fn between<V, L, R>(left: Parser<L>, right: Parser<R>, parser: Parser<V>)
    -> Parser<V>
    where
        V: 'static,
        L: 'static,
        R: 'static,
{
    let label = label_call("between",
        [left.label_repr(), right.label_repr(), parser.label_repr()]);
    Parser::new(label, move |ctx| {
        let _ = left.run(ctx)?;
        let value = parser.run(ctx)?;
        let _ = right.run(ctx)?;
        Ok(value)
    })
}

/// Returns a parser which parses `parser` with optional whitespace on
/// either side.
pub fn spaced<V>(parser: Parser<V>) -> Parser<V>
    where V: 'static
{
    let label = label_call("spaced", [parser.label_repr()]);
    let space = whitespace().ignore();
    Parser::new(label, move |ctx| {
        let _ = space.run(ctx)?;
        let value = parser.run(ctx)?;
        let _ = space.run(ctx)?;
        Ok(value)
    })
}

/// Returns a parser which tries each of the given parsers in order,
/// returning the first success. A failing branch that consumed input
/// propagates its failure; an empty list always fails.
pub fn choice<V>(parsers: Vec<Parser<V>>) -> Parser<V>
    where V: 'static
{
    let label = label_call("choice",
        parsers.iter().map(LabelRepr::label_repr).collect::<Vec<_>>());
    let expected = label.clone();
    Parser::new(label, move |ctx| {
        let entry = ctx.pos();
        for parser in &parsers {
            match parser.run(ctx) {
                Ok(value) => return Ok(value),
                Err(failure) if failure.at == entry => continue,
                Err(failure) => return Err(failure),
            }
        }
        Err(Failure::new(entry, expected.clone()))
    })
}

/// Returns a parser which runs the given parser without committing any
/// cursor movement.
pub fn peek<V>(parser: Parser<V>) -> Parser<V>
    where V: 'static
{
    parser.peek()
}

/// Returns a parser which forces unconditional backtracking: a failure of
/// the inner parser is reported as having consumed nothing, so an enclosing
/// alternation may retry from the entry position.
pub fn backtrack<V>(parser: Parser<V>) -> Parser<V>
    where V: 'static
{
    let label = label_call("backtrack", [parser.label_repr()]);
    Parser::new(label, move |ctx| {
        let entry = ctx.pos();
        parser.run(ctx).map_err(|failure| failure.uncommitted(entry))
    })
}

/// Returns a parser whose construction is deferred to the first parse,
/// allowing forward references while a grammar is being defined.
pub fn lazy<V, F>(f: F) -> Parser<V>
    where
        V: 'static,
        F: Fn() -> Parser<V> + 'static,
{
    let cell: Rc<OnceCell<Parser<V>>> = Rc::new(OnceCell::new());
    Parser::new("lazy", move |ctx| {
        cell.get_or_init(|| (f)()).run(ctx)
    })
    .ignore()
}

/// Returns the fix-point of the given grammar function: a parser `p`
/// equivalent to `f(p)`.
///
/// The parser handed to `f` holds a non-owning reference back to the cell
/// the constructed grammar is stored in, so no ownership cycle forms.
pub fn recursive<V, F>(f: F) -> Parser<V>
    where
        V: 'static,
        F: FnOnce(Parser<V>) -> Parser<V>,
{
    let cell: Rc<OnceCell<Parser<V>>> = Rc::new(OnceCell::new());
    let weak = Rc::downgrade(&cell);
    let proxy = Parser::new("recursive", move |ctx: &mut Context| {
        let cell = weak.upgrade()
            .ok_or_else(|| Failure::new(ctx.pos(), "recursive"))?;
        match cell.get() {
            Some(parser) => parser.run(ctx),
            None => Err(Failure::new(ctx.pos(), "recursive")),
        }
    })
    .ignore();

    let inner = f(proxy);
    let label = label_call("recursive", [inner.label_repr()]);
    let _ = cell.set(inner);
    Parser::new(label, move |ctx| {
        match cell.get() {
            Some(parser) => parser.run(ctx),
            None => Err(Failure::new(ctx.pos(), "recursive")),
        }
    })
    .ignore()
}

/// Returns a parser which repeatedly folds an accumulator through the
/// parsers produced by `f`, beginning from the value of `init`.
///
/// Each round parses `f(accum)`; the first failing round ends the loop and
/// the last successful accumulator is the parser's value, so a transform
/// applied by a failing round is never observed. The sole failure mode is
/// failure of `init`.
pub fn reduce<V, F>(init: Parser<V>, f: F) -> Parser<V>
    where
        V: Clone + 'static,
        F: Fn(V) -> Parser<V> + 'static,
{
    let label = label_call("reduce", [init.label_repr()]);
    Parser::new(label, move |ctx| {
        let mut accum = init.run(ctx)?;
        loop {
            if ctx.at_end() { break; }
            let before = ctx.pos();
            match (f)(accum.clone()).run(ctx) {
                Ok(next) => {
                    accum = next;
                    if ctx.pos() == before { break; }
                },
                Err(_) => break,
            }
        }
        Ok(accum)
    })
}


////////////////////////////////////////////////////////////////////////////////
// Routine
////////////////////////////////////////////////////////////////////////////////
/// The handle given to a [`coroutine`] block, through which it directs the
/// parse with ordinary control flow.
///
/// [`coroutine`]: fn.coroutine.html
pub struct Routine<'a> {
    ctx: &'a mut Context,
}

impl<'a> Routine<'a> {
    /// Runs the given parser at the current position.
    pub fn parse<U>(&mut self, parser: &Parser<U>) -> ParseResult<U>
        where U: 'static
    {
        parser.run(self.ctx)
    }

    /// Returns the current cursor offset.
    pub fn pos(&self) -> usize {
        self.ctx.pos()
    }

    /// Returns true if the input is at its end.
    pub fn at_end(&mut self) -> bool {
        self.ctx.at_end()
    }
}

/// Returns a parser driven by the given block, which receives a [`Routine`]
/// and may invoke parsers arbitrarily. The block's value is the parser's
/// value; a failure inside any invoked parser propagates out of the block
/// with `?`.
///
/// [`Routine`]: struct.Routine.html
pub fn coroutine<V, F>(f: F) -> Parser<V>
    where
        V: 'static,
        F: Fn(&mut Routine<'_>) -> ParseResult<V> + 'static,
{
    Parser::new("coroutine", move |ctx| {
        let mut routine = Routine { ctx };
        (f)(&mut routine)
    })
}


////////////////////////////////////////////////////////////////////////////////
// Splicer
////////////////////////////////////////////////////////////////////////////////
/// The marker handed to a [`splice`] region, used to designate the parsers
/// whose activations survive splicing.
///
/// [`splice`]: fn.splice.html
pub struct Splicer {
    _private: (),
}

impl Splicer {
    /// Marks the given parser as a surviving boundary: its activation and
    /// subtree are kept in rendered diagnostics.
    pub fn end<V>(&self, parser: Parser<V>) -> Parser<V>
        where V: 'static
    {
        parser.splice_end()
    }
}

/// Builds a parser whose interior activations are elided from rendered
/// diagnostics. Activations opened inside the region are skipped (their
/// children promoted) except the region boundary itself and any subtree
/// marked with [`Splicer::end`].
///
/// [`Splicer::end`]: struct.Splicer.html#method.end
pub fn splice<V, F>(f: F) -> Parser<V>
    where
        V: 'static,
        F: FnOnce(&Splicer) -> Parser<V>,
{
    let splicer = Splicer { _private: () };
    f(&splicer).splice_start()
}
