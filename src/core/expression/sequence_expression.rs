// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequence combinator
//!
//! Components are ordered. The match sets obey a left-to-right chain:
//!
//! - set `i > 0` is non-empty only if set `i - 1` is non-empty;
//! - every event in set `i > 0` is strictly after the earliest event of set `i - 1`.
//!
//! So the composite is satisfied exactly when the last set is non-empty.
//! An [`AdjacencyRule`] decides which events may follow each other: plain
//! temporal precedence here, contiguity for the strict variant.

use super::combination_builder::build_combinations;
use super::combinator::{CombinatorCore, CombinatorKind, CompositeBase};
use super::component::ComponentExpression;
use super::notification::{Combination, ExpressionId, MatchPart};
use crate::core::config::CombinatorSettings;
use crate::core::error::CombinatorResult;
use crate::core::event::Event;
use crate::core::window::MatchWindow;
use std::fmt;

/// Adjacency policy between consecutive sequence slots.
pub trait AdjacencyRule: fmt::Debug + Default + Send + Sync {
    const KIND: CombinatorKind;

    /// Observe an event entering the composite, before components see it.
    fn observe_add(&mut self, _event: &Event) {}

    /// Observe an event leaving the composite, before components forget it.
    fn observe_remove(&mut self, _event: &Event) {}

    /// Extra admission condition for `candidate` in a slot whose predecessor
    /// slot currently holds `previous`.
    fn admits(&self, previous: &MatchWindow, candidate: &Event) -> bool;

    /// Whether `root` may sit directly before `tail` in a combination.
    fn precedes(&self, root: &Event, tail: &Event) -> bool;

    /// Re-check every slot after a removal instead of only the slots whose
    /// predecessor changed.
    fn revalidates_on_remove(&self) -> bool {
        false
    }

    /// Whether the last observed add altered adjacency among events already
    /// held, e.g. a late arrival slotting between two live events. Resets
    /// the flag.
    fn take_disturbed(&mut self) -> bool {
        false
    }

    fn clear(&mut self) {}
}

/// Plain temporal ordering: a root precedes a tail iff `root.is_before(tail)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemporalOrder;

impl AdjacencyRule for TemporalOrder {
    const KIND: CombinatorKind = CombinatorKind::Sequence;

    fn admits(&self, _previous: &MatchWindow, _candidate: &Event) -> bool {
        true
    }

    fn precedes(&self, root: &Event, tail: &Event) -> bool {
        root.is_before(tail)
    }
}

#[derive(Debug)]
pub struct SequenceCore<R: AdjacencyRule> {
    base: CompositeBase,
    rule: R,
}

impl<R: AdjacencyRule> SequenceCore<R> {
    pub fn new(
        name: impl Into<String>,
        components: Vec<Box<dyn ComponentExpression>>,
        settings: CombinatorSettings,
    ) -> CombinatorResult<Self> {
        Ok(Self {
            base: CompositeBase::new(name, components, settings)?,
            rule: R::default(),
        })
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Slot 0 is always enabled; slot `i` needs a non-empty predecessor whose
    /// earliest event strictly precedes the candidate, plus the rule's own check.
    fn admissible(rule: &R, previous: Option<&MatchWindow>, candidate: &Event) -> bool {
        match previous {
            None => true,
            Some(previous) => match previous.first() {
                None => false,
                Some(floor) => floor.is_before(candidate) && rule.admits(previous, candidate),
            },
        }
    }

    /// Re-establish the chain invariant left to right.
    ///
    /// `changed[i]` marks slots that lost events. A slot whose predecessor
    /// became empty is cleared; a slot whose predecessor changed is pruned
    /// against both the floor and the adjacency rule.
    fn restore_chain(&mut self, changed: &[bool], revalidate_all: bool) {
        let name = &self.base.id.name;
        let rule = &self.rule;
        let mut previous_changed = changed.first().copied().unwrap_or(false);

        for i in 1..self.base.components.len() {
            let (before, rest) = self.base.components.split_at_mut(i);
            let previous = before[i - 1].match_set();
            let component = &mut rest[0];

            let pruned = match previous.first().cloned() {
                None => component.retain_matches(&mut |_: &Event| false),
                Some(floor) if previous_changed || revalidate_all => {
                    component.retain_matches(&mut |m: &Event| {
                        floor.is_before(m) && rule.admits(previous, m)
                    })
                }
                Some(_) => Vec::new(),
            };

            if !pruned.is_empty() {
                log::trace!("[{}] slot {} pruned {} match(es)", name, i, pruned.len());
            }
            previous_changed = changed.get(i).copied().unwrap_or(false) || !pruned.is_empty();
        }
    }

    fn sync_triggers(&mut self) {
        match self.base.components.last() {
            Some(last) => {
                let last = last.match_set();
                self.base.triggers.retain(|t| last.contains(t));
            }
            None => {
                self.base.triggers.clear();
            }
        }
    }

    fn preceding_sets(&self) -> Vec<&MatchWindow> {
        let mut sets = self.base.match_sets();
        sets.pop();
        sets
    }
}

impl<R: AdjacencyRule + 'static> CombinatorCore for SequenceCore<R> {
    fn id(&self) -> &ExpressionId {
        &self.base.id
    }

    fn kind(&self) -> CombinatorKind {
        R::KIND
    }

    fn settings(&self) -> &CombinatorSettings {
        &self.base.settings
    }

    fn components(&self) -> &[Box<dyn ComponentExpression>] {
        &self.base.components
    }

    fn dispatch(&mut self, event: &Event) -> bool {
        self.rule.observe_add(event);

        let count = self.base.len();
        let floors: Vec<Option<Event>> = self
            .base
            .components
            .iter()
            .map(|c| c.match_set().first().cloned())
            .collect();

        let mut newly_matched = false;
        for i in 0..count {
            let (before, rest) = self.base.components.split_at_mut(i);
            let previous = before.last().map(|c| c.match_set());
            let rule = &self.rule;
            let mut gate = |e: &Event| Self::admissible(rule, previous, e);
            if rest[0].add_gated(event, &mut gate) {
                log::trace!("[{}] slot {} admitted {}", self.base.id.name, i, event);
                if i + 1 == count {
                    newly_matched = true;
                }
            }
        }

        // Capacity eviction raises a slot's floor and a late arrival can
        // break adjacency; either way prune what no longer fits the chain.
        let disturbed = self.rule.take_disturbed();
        let floors_moved = self
            .base
            .components
            .iter()
            .zip(&floors)
            .any(|(c, floor)| c.match_set().first() != floor.as_ref());
        if floors_moved || disturbed {
            let all = vec![true; count];
            self.restore_chain(&all, false);
        }

        newly_matched = newly_matched
            && self
                .base
                .components
                .last()
                .is_some_and(|c| c.has_matched(event));
        if newly_matched {
            self.base.record_trigger(event);
        }
        self.sync_triggers();
        newly_matched
    }

    fn retract(&mut self, event: &Event) -> bool {
        self.rule.observe_remove(event);
        let changed = self.base.remove_from_all(event);
        let revalidate_all = self.rule.revalidates_on_remove();
        self.restore_chain(&changed, revalidate_all);
        self.base.triggers.remove(event);
        self.sync_triggers();
        changed.into_iter().any(|c| c)
    }

    fn is_satisfied(&self) -> bool {
        self.base
            .components
            .last()
            .map_or(true, |last| last.is_true())
    }

    fn complex_part(&self, trigger: &Event) -> MatchPart {
        let rule = &self.rule;
        let precedes = |root: &Event, tail: &Event| rule.precedes(root, tail);
        let combinations = build_combinations(&self.preceding_sets(), Some(trigger), &precedes);
        MatchPart::Combinations(combinations)
    }

    fn current_combinations(&self) -> Vec<Combination> {
        let rule = &self.rule;
        let precedes = |root: &Event, tail: &Event| rule.precedes(root, tail);
        build_combinations(&self.base.match_sets(), None, &precedes)
    }
}

impl<R: AdjacencyRule + 'static> ComponentExpression for SequenceCore<R> {
    fn name(&self) -> &str {
        &self.base.id.name
    }

    fn add(&mut self, event: &Event) -> bool {
        self.dispatch(event)
    }

    fn remove(&mut self, event: &Event) -> bool {
        self.retract(event)
    }

    fn discard(&mut self, event: &Event) -> bool {
        self.base.triggers.remove(event)
    }

    fn retain_matches(&mut self, keep: &mut dyn FnMut(&Event) -> bool) -> Vec<Event> {
        self.base.triggers.retain(|e| keep(e))
    }

    fn match_set(&self) -> &MatchWindow {
        &self.base.triggers
    }

    fn clear(&mut self) {
        self.base.reset();
        self.rule.clear();
    }
}
