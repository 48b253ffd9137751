////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Annotated failure diagnostics.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::parser::Context;
use crate::result::Failure;
use crate::result::ParseError;
use crate::trace::Outcome;
use crate::trace::Trace;


////////////////////////////////////////////////////////////////////////////////
// render
////////////////////////////////////////////////////////////////////////////////
/// Renders the diagnostic block for a failed parse: a header naming the
/// failing line, the line's text verbatim, and one row per displayed
/// activation showing its span in a left gutter and its outcome and label
/// on the right.
///
/// Failure rows come first, deepest activation first; success rows follow
/// in reverse completion order. Activations marked ignored or elided by
/// splicing are omitted with their children promoted.
pub(crate) fn render(ctx: &Context, failure: &Failure) -> ParseError {
    let at = failure.at;
    let (line, column) = ctx.source.line_col(at);
    let (lstart, lend) = ctx.source.line_bounds(at);
    let line_text = ctx.source.slice(lstart, lend);
    let line_len = lend - lstart;

    let mut out = format!("line {}:\n  {}", line, line_text);

    let roots = visible_roots(&ctx.trace);
    let failures = failure_path(&ctx.trace, &roots);
    let successes = successes_overlapping(&ctx.trace, &roots, lstart, lend);

    for &id in failures.iter().rev() {
        out.push('\n');
        out.push_str(&row(&ctx.trace, id, lstart, line_len, "failure"));
    }
    for &id in &successes {
        out.push('\n');
        out.push_str(&row(&ctx.trace, id, lstart, line_len, "success"));
    }

    ParseError {
        expected: failure.expected.clone(),
        at,
        line,
        column,
        diagnostic: out,
    }
}

/// Renders one gutter row for the given activation.
fn row(
    trace: &Trace,
    id: usize,
    lstart: usize,
    line_len: usize,
    kind: &str)
    -> String
{
    let node = trace.node(id);
    // One extra column so zero-width spans at the line end stay visible.
    let width = 2 + line_len + 1;
    let mut gutter = vec![' '; width];

    let start = node.start as isize - lstart as isize;
    let end = node.end as isize - lstart as isize;
    let limit = line_len as isize;

    if node.end == node.start {
        // Zero-consumption span.
        if start < 0 {
            gutter[2] = '<';
        } else if start > limit {
            gutter[2 + line_len] = '>';
        } else {
            gutter[2 + start as usize] = '|';
        }
    } else {
        // Inclusive column span, clipped to the displayed line.
        let first = end - 1;
        let left_clipped = start < 0;
        let right_clipped = first > limit;
        let a = start.max(0) as usize;
        let b = first.min(limit) as usize;
        if a == b {
            gutter[2 + a] = if left_clipped { '<' }
                else if right_clipped { '>' }
                else { 'V' };
        } else {
            for col in a..=b {
                gutter[2 + col] = '-';
            }
            gutter[2 + a] = if left_clipped { '<' } else { '\\' };
            gutter[2 + b] = if right_clipped { '>' } else { '/' };
        }
    }

    let mut text: String = gutter.into_iter().collect();
    text.push_str(&format!(" * {}: {}", kind, node.label));
    text
}

/// Returns the top-level visible activations, promoting the children of
/// ignored and spliced nodes.
fn visible_roots(trace: &Trace) -> Vec<usize> {
    let mut roots = Vec::new();
    if let Some(root) = trace.root() {
        promote(trace, root, &mut roots);
    }
    roots
}

/// Adds the given node to `out` if it is visible, or its promoted children
/// otherwise.
fn promote(trace: &Trace, id: usize, out: &mut Vec<usize>) {
    let node = trace.node(id);
    if node.ignore || node.spliced {
        for &child in &node.children {
            promote(trace, child, out);
        }
    } else {
        out.push(id);
    }
}

/// Returns the visible children of the given node, promoting through
/// ignored and spliced descendants.
fn visible_children(trace: &Trace, id: usize) -> Vec<usize> {
    let mut out = Vec::new();
    for &child in &trace.node(id).children {
        promote(trace, child, &mut out);
    }
    out
}

/// Returns the chain of visible activations leading to the propagated
/// failure, from the outermost down: at each step the most recently
/// attempted failing child is followed.
fn failure_path(trace: &Trace, roots: &[usize]) -> Vec<usize> {
    let mut path = Vec::new();
    let mut level: Vec<usize> = roots.to_vec();
    loop {
        let next = level.iter()
            .rev()
            .find(|&&id| trace.node(id).outcome == Outcome::Failure)
            .copied();
        match next {
            Some(id) => {
                path.push(id);
                level = visible_children(trace, id);
            },
            None => break,
        }
    }
    path
}

/// Returns every visible successful activation whose span overlaps the
/// displayed line, most recently completed first.
fn successes_overlapping(
    trace: &Trace,
    roots: &[usize],
    lstart: usize,
    lend: usize)
    -> Vec<usize>
{
    let mut found = Vec::new();
    let mut pending: Vec<usize> = roots.to_vec();
    while let Some(id) = pending.pop() {
        let node = trace.node(id);
        if node.outcome == Outcome::Success
            && node.start <= lend
            && node.end >= lstart
        {
            found.push(id);
        }
        pending.extend(visible_children(trace, id));
    }
    found.sort_by(|a, b| {
        trace.node(*b).closed_seq.cmp(&trace.node(*a).closed_seq)
    });
    found
}
