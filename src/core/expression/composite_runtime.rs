// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread-safe composite wrapper
//!
//! Every composite owns a single synchronization domain covering all of its
//! components. `add` and `remove` take the write lock for the whole dispatch,
//! so concurrent deliveries are serialized and every component observes the
//! same event order. Queries take the read lock and may run in parallel.
//!
//! Notifications are built under the write lock, so they describe exactly the
//! state this event produced. Listeners are invoked after the lock is
//! released but before `add` returns, which lets a listener query the
//! composite without deadlocking.

use super::and_expression::AndCore;
use super::combinator::{CombinatorCore, CombinatorKind, CompositeState};
use super::component::ComponentExpression;
use super::notification::{Combination, ExpressionId, MatchNotification};
use super::sequence_expression::{AdjacencyRule, SequenceCore, TemporalOrder};
use super::strict_sequence_expression::Contiguity;
use crate::core::config::CombinatorSettings;
use crate::core::error::CombinatorResult;
use crate::core::event::Event;
use crate::core::window::{Listener, ListenerRegistry};
use serde::Serialize;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type AndExpression = CompositeRuntime<AndCore>;
pub type SequenceExpression = CompositeRuntime<SequenceCore<TemporalOrder>>;
pub type StrictSequenceExpression = CompositeRuntime<SequenceCore<Contiguity>>;

/// Point-in-time view of a composite, for diagnostics and persistence.
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionSnapshot {
    pub id: ExpressionId,
    pub kind: CombinatorKind,
    pub state: CompositeState,
    pub components: Vec<ComponentSnapshot>,
    pub triggers: Vec<Event>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentSnapshot {
    pub name: String,
    pub capacity: usize,
    pub matches: Vec<Event>,
}

impl ExpressionSnapshot {
    pub fn to_json(&self) -> CombinatorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> CombinatorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug)]
pub struct CompositeRuntime<C: CombinatorCore> {
    core: RwLock<C>,
    listeners: RwLock<ListenerRegistry<MatchNotification>>,
}

impl<C: CombinatorCore> CompositeRuntime<C> {
    pub fn from_core(core: C) -> Self {
        Self {
            core: RwLock::new(core),
            listeners: RwLock::new(ListenerRegistry::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, C> {
        self.core.read().unwrap_or_else(|poisoned| {
            log::error!("composite lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, C> {
        self.core.write().unwrap_or_else(|poisoned| {
            log::error!("composite lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    fn listeners_read(&self) -> RwLockReadGuard<'_, ListenerRegistry<MatchNotification>> {
        self.listeners.read().unwrap_or_else(|poisoned| {
            log::error!("listener registry lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    fn listeners_write(&self) -> RwLockWriteGuard<'_, ListenerRegistry<MatchNotification>> {
        self.listeners.write().unwrap_or_else(|poisoned| {
            log::error!("listener registry lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    /// Deliver one event. Returns the notifications it produced (empty unless
    /// the composite became newly satisfied), after they reached every
    /// registered listener.
    pub fn add(&self, event: &Event) -> Vec<MatchNotification> {
        let notifications = {
            let mut core = self.write();
            let before = core.state();
            let newly_matched = core.dispatch(event);
            let after = core.state();
            if before != after {
                log::debug!("[{}] {:?} -> {:?} on {}", core.id().name, before, after, event);
            }
            if newly_matched {
                core.build_notifications(event)
            } else {
                Vec::new()
            }
        };

        if !notifications.is_empty() {
            let listeners = self.listeners_read().snapshot();
            for notification in &notifications {
                for listener in &listeners {
                    listener(notification);
                }
            }
        }
        notifications
    }

    /// Retract an event from every component. Absent events are a no-op.
    pub fn remove(&self, event: &Event) -> bool {
        let mut core = self.write();
        let before = core.state();
        let removed = core.retract(event);
        let after = core.state();
        if before != after {
            log::debug!("[{}] {:?} -> {:?} on removal of {}", core.id().name, before, after, event);
        }
        removed
    }

    pub fn is_true(&self) -> bool {
        self.read().is_satisfied()
    }

    pub fn state(&self) -> CompositeState {
        self.read().state()
    }

    /// Copy of every component's match set, in component order.
    pub fn match_sets(&self) -> Vec<Vec<Event>> {
        self.read()
            .components()
            .iter()
            .map(|c| c.match_set().to_vec())
            .collect()
    }

    /// Events that newly satisfied the composite and are still backed by matches.
    pub fn triggers(&self) -> Vec<Event> {
        self.read().match_set().to_vec()
    }

    pub fn has_matched(&self, event: &Event) -> bool {
        self.read().has_matched(event)
    }

    pub fn current_combinations(&self) -> Vec<Combination> {
        self.read().current_combinations()
    }

    pub fn component_count(&self) -> usize {
        self.read().components().len()
    }

    pub fn id(&self) -> ExpressionId {
        self.read().id().clone()
    }

    pub fn name(&self) -> String {
        self.read().id().name.clone()
    }

    pub fn kind(&self) -> CombinatorKind {
        self.read().kind()
    }

    pub fn settings(&self) -> CombinatorSettings {
        *self.read().settings()
    }

    /// Reset every component and the trigger window. Listeners stay registered.
    pub fn clear(&self) {
        let mut core = self.write();
        core.clear();
        log::debug!("[{}] cleared", core.id().name);
    }

    pub fn register_listener(&self, listener: Listener<MatchNotification>) -> bool {
        self.listeners_write().register(listener)
    }

    pub fn unregister_listener(&self, listener: &Listener<MatchNotification>) -> bool {
        self.listeners_write().unregister(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners_read().len()
    }

    pub fn snapshot(&self) -> ExpressionSnapshot {
        let core = self.read();
        ExpressionSnapshot {
            id: core.id().clone(),
            kind: core.kind(),
            state: core.state(),
            components: core
                .components()
                .iter()
                .map(|c| ComponentSnapshot {
                    name: c.name().to_string(),
                    capacity: c.match_set().capacity(),
                    matches: c.match_set().to_vec(),
                })
                .collect(),
            triggers: core.match_set().to_vec(),
        }
    }

    /// Unwrap the core, e.g. to nest this composite inside another one.
    /// Registered listeners are dropped.
    pub fn into_core(self) -> C {
        self.core.into_inner().unwrap_or_else(|poisoned| {
            log::error!("composite lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }
}

impl<C: CombinatorCore + 'static> CompositeRuntime<C> {
    /// Turn this composite into a component of an enclosing composite. Its
    /// match set is the window of events that satisfied it.
    pub fn into_component(self) -> Box<dyn ComponentExpression> {
        Box::new(self.into_core())
    }
}

impl CompositeRuntime<AndCore> {
    pub fn new(
        name: impl Into<String>,
        components: Vec<Box<dyn ComponentExpression>>,
    ) -> CombinatorResult<Self> {
        Self::with_settings(name, components, CombinatorSettings::default())
    }

    pub fn with_settings(
        name: impl Into<String>,
        components: Vec<Box<dyn ComponentExpression>>,
        settings: CombinatorSettings,
    ) -> CombinatorResult<Self> {
        Ok(Self::from_core(AndCore::new(name, components, settings)?))
    }
}

impl<R: AdjacencyRule + 'static> CompositeRuntime<SequenceCore<R>> {
    pub fn new(
        name: impl Into<String>,
        components: Vec<Box<dyn ComponentExpression>>,
    ) -> CombinatorResult<Self> {
        Self::with_settings(name, components, CombinatorSettings::default())
    }

    pub fn with_settings(
        name: impl Into<String>,
        components: Vec<Box<dyn ComponentExpression>>,
        settings: CombinatorSettings,
    ) -> CombinatorResult<Self> {
        Ok(Self::from_core(SequenceCore::new(name, components, settings)?))
    }
}
