// SPDX-License-Identifier: MIT OR Apache-2.0

//! AND combinator
//!
//! True while every component holds at least one match; components are
//! otherwise independent. Each event is fed to every component, even after
//! one of them rejects it, because every component must observe every event
//! to keep its own state correct.
//!
//! New combinations are reported in condensed form. For a trigger `t` and each
//! component `k` whose match set contains `t`, the template is
//!
//! ```text
//! [ S0 - {t}, ..., S(k-1) - {t}, {t}, S(k+1), ..., S(n-1) ]
//! ```
//!
//! i.e. `k` is the first slot holding `t`. Templates for different `k` are
//! therefore disjoint and together cover exactly the combinations that
//! contain `t`, without materializing the cross product.

use super::combinator::{CombinatorCore, CombinatorKind, CompositeBase};
use super::component::ComponentExpression;
use super::notification::{Combination, CondensedCombination, ExpressionId, MatchPart};
use crate::core::config::CombinatorSettings;
use crate::core::error::CombinatorResult;
use crate::core::event::Event;
use crate::core::window::MatchWindow;
use std::cmp::Ordering;

#[derive(Debug)]
pub struct AndCore {
    base: CompositeBase,
}

impl AndCore {
    pub fn new(
        name: impl Into<String>,
        components: Vec<Box<dyn ComponentExpression>>,
        settings: CombinatorSettings,
    ) -> CombinatorResult<Self> {
        Ok(Self {
            base: CompositeBase::new(name, components, settings)?,
        })
    }

    fn condensed_for(&self, trigger: &Event) -> Vec<CondensedCombination> {
        let sets = self.base.match_sets();
        let mut condensed: Vec<CondensedCombination> = Vec::new();
        for (k, set) in sets.iter().enumerate() {
            if !set.contains(trigger) {
                continue;
            }
            let slots = sets
                .iter()
                .enumerate()
                .map(|(j, other)| match j.cmp(&k) {
                    Ordering::Less => other.iter().filter(|e| *e != trigger).cloned().collect(),
                    Ordering::Equal => vec![trigger.clone()],
                    Ordering::Greater => other.to_vec(),
                })
                .collect();
            let template = CondensedCombination::new(slots);
            if template.is_empty() || condensed.contains(&template) {
                continue;
            }
            condensed.push(template);
        }
        condensed
    }

    fn sync_triggers(&mut self) {
        if !self.is_satisfied() {
            self.base.triggers.clear();
            return;
        }
        let components = &self.base.components;
        self.base
            .triggers
            .retain(|t| components.iter().any(|c| c.has_matched(t)));
    }
}

impl CombinatorCore for AndCore {
    fn id(&self) -> &ExpressionId {
        &self.base.id
    }

    fn kind(&self) -> CombinatorKind {
        CombinatorKind::And
    }

    fn settings(&self) -> &CombinatorSettings {
        &self.base.settings
    }

    fn components(&self) -> &[Box<dyn ComponentExpression>] {
        &self.base.components
    }

    fn dispatch(&mut self, event: &Event) -> bool {
        let mut any_matched = false;
        for (index, component) in self.base.components.iter_mut().enumerate() {
            if component.add(event) {
                log::trace!(
                    "[{}] component {} ({}) matched {}",
                    self.base.id.name,
                    index,
                    component.name(),
                    event
                );
                any_matched = true;
            }
        }

        let newly_matched = any_matched && self.base.all_non_empty();
        if newly_matched {
            self.base.record_trigger(event);
        }
        newly_matched
    }

    fn retract(&mut self, event: &Event) -> bool {
        let removed = self.base.remove_from_all(event).into_iter().any(|r| r);
        self.base.triggers.remove(event);
        self.sync_triggers();
        removed
    }

    fn is_satisfied(&self) -> bool {
        self.base.all_non_empty()
    }

    fn complex_part(&self, trigger: &Event) -> MatchPart {
        MatchPart::Condensed(self.condensed_for(trigger))
    }

    fn current_combinations(&self) -> Vec<Combination> {
        let slots = self.base.match_sets().iter().map(|s| s.to_vec()).collect();
        CondensedCombination::new(slots).expand()
    }
}

impl ComponentExpression for AndCore {
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
    }
}
