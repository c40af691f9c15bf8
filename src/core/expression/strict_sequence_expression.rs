// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strict (contiguous) sequences
//!
//! On top of the temporal chain, a match in slot `i > 0` must start right
//! after a match of slot `i - 1` ends: the immediate predecessor of its first
//! atomic event, among every live event the composite has seen, is the last
//! atomic event of some match held by the previous slot, and that match must
//! strictly precede it. An equal-timestamp neighbour is adjacent in the
//! total order but concurrent, so it never links two slots.
//!
//! Adjacency is computed over a context set that is independent of which
//! component claims an event, so events matching no component still break
//! contiguity.

use super::sequence_expression::AdjacencyRule;
use super::combinator::CombinatorKind;
use crate::core::event::{AtomicEvent, Event};
use crate::core::window::MatchWindow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Every live event, plus a reference-counted index of their atomic parts.
///
/// Activities share atoms with each other and with atomic events, so an atom
/// stays live until the last event holding it is removed.
#[derive(Debug, Default, Clone)]
pub struct ContextSet {
    live: BTreeSet<Event>,
    atoms: BTreeMap<Arc<AtomicEvent>, usize>,
}

impl ContextSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the event was not live before.
    pub fn insert(&mut self, event: &Event) -> bool {
        if !self.live.insert(event.clone()) {
            return false;
        }
        for atom in event.atoms() {
            *self.atoms.entry(Arc::clone(atom)).or_insert(0) += 1;
        }
        true
    }

    pub fn remove(&mut self, event: &Event) -> bool {
        if !self.live.remove(event) {
            return false;
        }
        for atom in event.atoms() {
            if let Some(count) = self.atoms.get_mut(atom) {
                *count -= 1;
                if *count == 0 {
                    self.atoms.remove(atom);
                }
            }
        }
        true
    }

    /// Live atom immediately before `atom`, if any.
    pub fn predecessor(&self, atom: &Arc<AtomicEvent>) -> Option<&Arc<AtomicEvent>> {
        self.atoms.range(..Arc::clone(atom)).next_back().map(|(a, _)| a)
    }

    /// Whether some live atom sorts after `atom`.
    pub fn has_successor(&self, atom: &Arc<AtomicEvent>) -> bool {
        self.atoms
            .last_key_value()
            .is_some_and(|(latest, _)| latest > atom)
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.live.contains(event)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
        self.atoms.clear();
    }
}

/// Contiguity rule backing [`StrictSequenceExpression`](super::StrictSequenceExpression).
///
/// Policy for late arrivals: an event that lands between two live events
/// changes the predecessor of its successor, so every slot is re-validated
/// and matches whose contiguity broke are pruned. Removals re-validate every
/// slot as well. The contiguity condition therefore holds after every
/// operation, whatever the arrival order.
#[derive(Debug, Default, Clone)]
pub struct Contiguity {
    context: ContextSet,
    disturbed: bool,
}

impl Contiguity {
    pub fn context(&self) -> &ContextSet {
        &self.context
    }

    fn directly_follows(&self, root: &Event, tail: &Event) -> bool {
        self.context.predecessor(tail.first()) == Some(root.last())
    }
}

impl AdjacencyRule for Contiguity {
    const KIND: CombinatorKind = CombinatorKind::StrictSequence;

    fn observe_add(&mut self, event: &Event) {
        if self.context.insert(event) && self.context.has_successor(event.last()) {
            self.disturbed = true;
        }
    }

    fn observe_remove(&mut self, event: &Event) {
        self.context.remove(event);
    }

    fn admits(&self, previous: &MatchWindow, candidate: &Event) -> bool {
        match self.context.predecessor(candidate.first()) {
            Some(predecessor) => previous
                .iter()
                .any(|m| m.last() == predecessor && m.is_before(candidate)),
            None => false,
        }
    }

    fn precedes(&self, root: &Event, tail: &Event) -> bool {
        root.is_before(tail) && self.directly_follows(root, tail)
    }

    fn revalidates_on_remove(&self) -> bool {
        true
    }

    fn take_disturbed(&mut self) -> bool {
        std::mem::take(&mut self.disturbed)
    }

    fn clear(&mut self) {
        self.context.clear();
        self.disturbed = false;
    }
}
