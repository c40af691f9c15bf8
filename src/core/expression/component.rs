// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component expression contract
//!
//! A component expression is a single-event matcher owned by exactly one
//! composite. Composites take components by value (`Box<dyn
//! ComponentExpression>`) and never hand out mutable access, so a component
//! cannot be driven by anything other than its owner.

use crate::core::event::Event;
use crate::core::window::MatchWindow;
use std::fmt;

pub trait ComponentExpression: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Evaluate an event. Returns `true` only when the event became a fresh
    /// member of the match set; events already matched are not re-evaluated.
    fn add(&mut self, event: &Event) -> bool;

    /// Like [`add`](Self::add), but the owner's `gate` must also accept the
    /// event before it may enter the match set. Returns `true` only for a
    /// fresh, accepted match.
    ///
    /// Leaves override this to consult the gate before inserting, so a
    /// rejected event never evicts an older match.
    fn add_gated(&mut self, event: &Event, gate: &mut dyn FnMut(&Event) -> bool) -> bool {
        if !self.add(event) {
            return false;
        }
        if gate(event) {
            true
        } else {
            self.discard(event);
            false
        }
    }

    /// Forget an event everywhere this expression tracks it. Absent events are a no-op.
    fn remove(&mut self, event: &Event) -> bool;

    /// Drop an event from this expression's own match set only. Used by an
    /// owning composite to reject a match that breaks its invariants.
    fn discard(&mut self, event: &Event) -> bool;

    /// Keep only matches for which `keep` holds; returns the dropped ones.
    fn retain_matches(&mut self, keep: &mut dyn FnMut(&Event) -> bool) -> Vec<Event>;

    fn match_set(&self) -> &MatchWindow;

    /// Reset to the freshly constructed state.
    fn clear(&mut self);

    fn is_true(&self) -> bool {
        !self.match_set().is_empty()
    }

    fn has_matched(&self, event: &Event) -> bool {
        self.match_set().contains(event)
    }
}
