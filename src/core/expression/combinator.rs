// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared composite machinery
//!
//! `CombinatorCore` is the lock-free half of a composite: it owns its
//! components and mutates them through `&mut self`. `CompositeRuntime` wraps a
//! core in a reader-writer lock for shared use, and a core moved out of its
//! runtime can itself be owned as a component of a larger composite.

use super::component::ComponentExpression;
use super::notification::{Combination, ExpressionId, MatchNotification, MatchPart};
use crate::core::config::CombinatorSettings;
use crate::core::error::{CombinatorError, CombinatorResult};
use crate::core::event::Event;
use crate::core::window::MatchWindow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinatorKind {
    And,
    Sequence,
    StrictSequence,
}

impl CombinatorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CombinatorKind::And => "and",
            CombinatorKind::Sequence => "sequence",
            CombinatorKind::StrictSequence => "strict-sequence",
        }
    }
}

/// Coarse lifecycle of a composite.
///
/// `Empty` until a component holds a match, `Partial` while some but not
/// enough components match, `Satisfied` while the composite is true. Every
/// transition is reversible; `clear` returns to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeState {
    Empty,
    Partial,
    Satisfied,
}

pub trait CombinatorCore: ComponentExpression {
    fn id(&self) -> &ExpressionId;

    fn kind(&self) -> CombinatorKind;

    fn settings(&self) -> &CombinatorSettings;

    fn components(&self) -> &[Box<dyn ComponentExpression>];

    /// Feed one event to every component in declared order. Returns `true`
    /// iff the composite became newly satisfied by this event.
    fn dispatch(&mut self, event: &Event) -> bool;

    /// Retract an event from every component and restore invariants.
    fn retract(&mut self, event: &Event) -> bool;

    fn is_satisfied(&self) -> bool;

    /// Combinations introduced by `trigger`.
    fn complex_part(&self, trigger: &Event) -> MatchPart;

    /// Every combination currently satisfying the composite.
    fn current_combinations(&self) -> Vec<Combination>;

    fn state(&self) -> CompositeState {
        if self.is_satisfied() {
            CompositeState::Satisfied
        } else if self.components().iter().any(|c| c.is_true()) {
            CompositeState::Partial
        } else {
            CompositeState::Empty
        }
    }

    fn build_notifications(&self, trigger: &Event) -> Vec<MatchNotification> {
        let settings = self.settings();
        let mut notifications = Vec::with_capacity(2);
        if settings.emit_single_event {
            notifications.push(MatchNotification::new(
                self.id().clone(),
                trigger.clone(),
                MatchPart::Event(trigger.clone()),
            ));
        }
        if settings.emit_complex {
            notifications.push(MatchNotification::new(
                self.id().clone(),
                trigger.clone(),
                self.complex_part(trigger),
            ));
        }
        notifications
    }
}

/// State common to every composite: identity, owned components and the
/// window of events that newly satisfied the composite.
#[derive(Debug)]
pub(crate) struct CompositeBase {
    pub(crate) id: ExpressionId,
    pub(crate) components: Vec<Box<dyn ComponentExpression>>,
    pub(crate) triggers: MatchWindow,
    pub(crate) settings: CombinatorSettings,
}

impl CompositeBase {
    pub(crate) fn new(
        name: impl Into<String>,
        components: Vec<Box<dyn ComponentExpression>>,
        settings: CombinatorSettings,
    ) -> CombinatorResult<Self> {
        let id = ExpressionId::new(name);
        if id.name.trim().is_empty() {
            return Err(CombinatorError::invalid_expression(
                "composite expressions need a non-empty name",
            ));
        }
        let triggers = MatchWindow::new(settings.composite_capacity)?;
        Ok(Self {
            id,
            components,
            triggers,
            settings,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn all_non_empty(&self) -> bool {
        self.components.iter().all(|c| c.is_true())
    }

    pub(crate) fn match_sets(&self) -> Vec<&MatchWindow> {
        self.components.iter().map(|c| c.match_set()).collect()
    }

    /// Remove `event` from every component; one flag per component.
    pub(crate) fn remove_from_all(&mut self, event: &Event) -> Vec<bool> {
        self.components.iter_mut().map(|c| c.remove(event)).collect()
    }

    pub(crate) fn record_trigger(&mut self, event: &Event) {
        self.triggers.add(event.clone());
    }

    pub(crate) fn reset(&mut self) {
        for component in &mut self.components {
            component.clear();
        }
        self.triggers.clear();
    }
}
