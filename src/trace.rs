////////////////////////////////////////////////////////////////////////////////
// Scoria parser combinator library
////////////////////////////////////////////////////////////////////////////////
// Copyright 2022 Skylor R. Schermer
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Live parse-tree recording.
////////////////////////////////////////////////////////////////////////////////

// External library imports.
use tracing::event;
use tracing::Level;


////////////////////////////////////////////////////////////////////////////////
// Outcome
////////////////////////////////////////////////////////////////////////////////
/// The recorded outcome of a parser activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The activation has not yet completed.
    InProgress,
    /// The activation completed successfully.
    Success,
    /// The activation failed.
    Failure,
}


////////////////////////////////////////////////////////////////////////////////
// Activation
////////////////////////////////////////////////////////////////////////////////
/// A single recorded parser invocation.
#[derive(Debug)]
pub(crate) struct Activation {
    /// The invoked parser's label.
    pub label: String,
    /// The cursor offset at entry.
    pub start: usize,
    /// The cursor offset at exit. Equals `start` until completion, and for
    /// every failed activation after restoration.
    pub end: usize,
    /// The recorded outcome.
    pub outcome: Outcome,
    /// The activations spawned during this one, in entry order.
    pub children: Vec<usize>,
    /// The enclosing activation.
    pub parent: Option<usize>,
    /// Omit this node from rendered diagnostics, promoting its children.
    pub ignore: bool,
    /// Elided by an enclosing splice region.
    pub spliced: bool,
    /// Completion sequence number; later closings get larger values.
    pub closed_seq: usize,
}


////////////////////////////////////////////////////////////////////////////////
// Region
////////////////////////////////////////////////////////////////////////////////
/// A splice-region state. Activations created while the top state is
/// `Splice` are elided from diagnostics; an end boundary pushes `Keep` so
/// its subtree survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    /// Inside a splice region; new activations are elided.
    Splice,
    /// Inside an end boundary; new activations are kept.
    Keep,
}


////////////////////////////////////////////////////////////////////////////////
// Trace
////////////////////////////////////////////////////////////////////////////////
/// The live tree of parser activations for a single parse call.
///
/// Nodes are stored in an arena indexed by entry order; the stack of open
/// activations tracks the path currently being parsed.
#[derive(Debug)]
pub(crate) struct Trace {
    nodes: Vec<Activation>,
    open: Vec<usize>,
    regions: Vec<Region>,
    completed: usize,
}

impl Trace {
    /// Constructs a new, empty `Trace`.
    pub(crate) fn new() -> Self {
        Trace {
            nodes: Vec::new(),
            open: Vec::new(),
            regions: Vec::new(),
            completed: 0,
        }
    }

    /// Opens a new activation under the currently open one and makes it
    /// current. Returns its node id.
    pub(crate) fn enter(
        &mut self,
        label: String,
        start: usize,
        ignore: bool,
        keep: bool)
        -> usize
    {
        let spliced = !keep
            && self.regions.last() == Some(&Region::Splice);
        let parent = self.open.last().copied();
        let id = self.nodes.len();
        self.nodes.push(Activation {
            label,
            start,
            end: start,
            outcome: Outcome::InProgress,
            children: Vec::new(),
            parent,
            ignore,
            spliced,
            closed_seq: 0,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        self.open.push(id);
        id
    }

    /// Closes the given activation with the given end offset and outcome,
    /// popping back to its parent.
    pub(crate) fn exit(&mut self, id: usize, end: usize, outcome: Outcome) {
        debug_assert_eq!(self.open.last().copied(), Some(id),
            "activations must close in stack order");
        let node = &mut self.nodes[id];
        node.end = end;
        node.outcome = outcome;
        node.closed_seq = self.completed;
        self.completed += 1;
        let _ = self.open.pop();

        if outcome == Outcome::Failure {
            event!(Level::TRACE, "failure: {} at {}", self.nodes[id].label,
                self.nodes[id].start);
        }
    }

    /// Pushes a splice-region state for the duration of an activation body.
    pub(crate) fn push_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    /// Pops the most recent splice-region state.
    pub(crate) fn pop_region(&mut self) {
        let _ = self.regions.pop();
    }

    /// Returns the root activation's id, if any parser has run.
    pub(crate) fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() { None } else { Some(0) }
    }

    /// Returns the activation with the given id.
    pub(crate) fn node(&self, id: usize) -> &Activation {
        &self.nodes[id]
    }

    /// Returns the number of recorded activations.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enter_exit_links_tree() {
        let mut trace = Trace::new();
        let outer = trace.enter("outer".into(), 0, false, false);
        let inner = trace.enter("inner".into(), 0, false, false);
        trace.exit(inner, 3, Outcome::Success);
        trace.exit(outer, 3, Outcome::Success);

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.root(), Some(outer));
        assert_eq!(trace.node(outer).children, vec![inner]);
        assert_eq!(trace.node(inner).parent, Some(outer));
        assert_eq!(trace.node(inner).end, 3);
        assert!(trace.node(inner).closed_seq < trace.node(outer).closed_seq);
    }

    #[test]
    fn splice_region_marks_interior() {
        let mut trace = Trace::new();
        let start = trace.enter("start".into(), 0, false, false);
        trace.push_region(Region::Splice);

        let elided = trace.enter("elided".into(), 0, false, false);
        let kept = trace.enter("kept".into(), 0, false, true);
        trace.push_region(Region::Keep);
        let inner = trace.enter("inner".into(), 0, false, false);
        trace.exit(inner, 1, Outcome::Success);
        trace.pop_region();
        trace.exit(kept, 1, Outcome::Success);
        trace.exit(elided, 1, Outcome::Success);

        trace.pop_region();
        trace.exit(start, 1, Outcome::Success);

        assert!(!trace.node(start).spliced);
        assert!(trace.node(elided).spliced);
        assert!(!trace.node(kept).spliced);
        assert!(!trace.node(inner).spliced);
    }
}
