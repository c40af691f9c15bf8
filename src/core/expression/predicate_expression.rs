// SPDX-License-Identifier: MIT OR Apache-2.0

use super::component::ComponentExpression;
use crate::core::config::CombinatorSettings;
use crate::core::error::CombinatorResult;
use crate::core::event::{AttributeValue, Event};
use crate::core::window::{Listener, ListenerRegistry, MatchWindow};
use std::fmt;
use std::sync::Arc;

pub type Predicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Leaf expression: a named predicate over a bounded match window.
pub struct PredicateExpression {
    name: String,
    predicate: Predicate,
    matches: MatchWindow,
    on_match: ListenerRegistry<Event>,
}

impl PredicateExpression {
    pub fn new<F>(name: impl Into<String>, capacity: usize, predicate: F) -> CombinatorResult<Self>
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Ok(Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            matches: MatchWindow::new(capacity)?,
            on_match: ListenerRegistry::new(),
        })
    }

    /// Build with the configured default capacity.
    pub fn with_settings<F>(
        name: impl Into<String>,
        settings: &CombinatorSettings,
        predicate: F,
    ) -> CombinatorResult<Self>
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Self::new(name, settings.match_capacity, predicate)
    }

    pub fn always(name: impl Into<String>, capacity: usize) -> CombinatorResult<Self> {
        Self::new(name, capacity, |_| true)
    }

    pub fn never(name: impl Into<String>, capacity: usize) -> CombinatorResult<Self> {
        Self::new(name, capacity, |_| false)
    }

    /// Matches events whose attribute at `index` equals `value`.
    pub fn attribute_equals(
        name: impl Into<String>,
        capacity: usize,
        index: usize,
        value: impl Into<AttributeValue>,
    ) -> CombinatorResult<Self> {
        let value = value.into();
        Self::new(name, capacity, move |e| e.attribute(index) == Some(&value))
    }

    /// Matches events starting within `[from, to]`.
    pub fn timestamp_between(
        name: impl Into<String>,
        capacity: usize,
        from: i64,
        to: i64,
    ) -> CombinatorResult<Self> {
        Self::new(name, capacity, move |e| (from..=to).contains(&e.timestamp()))
    }

    /// Register a callback fired whenever an event freshly matches.
    pub fn on_match(&mut self, listener: Listener<Event>) -> bool {
        self.on_match.register(listener)
    }

    pub fn remove_on_match(&mut self, listener: &Listener<Event>) -> bool {
        self.on_match.unregister(listener)
    }

    pub fn boxed(self) -> Box<dyn ComponentExpression> {
        Box::new(self)
    }
}

impl fmt::Debug for PredicateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateExpression")
            .field("name", &self.name)
            .field("matches", &self.matches.len())
            .field("capacity", &self.matches.capacity())
            .finish()
    }
}

impl ComponentExpression for PredicateExpression {
    fn name(&self) -> &str {
        &self.name
    }

    fn add(&mut self, event: &Event) -> bool {
        self.add_gated(event, &mut |_: &Event| true)
    }

    fn add_gated(&mut self, event: &Event, gate: &mut dyn FnMut(&Event) -> bool) -> bool {
        if self.matches.contains(event) {
            return false;
        }
        if !(self.predicate)(event) || !gate(event) {
            return false;
        }
        let change = self.matches.add(event.clone());
        if !change.evicted.is_empty() {
            log::trace!(
                "[{}] evicted {} match(es) at capacity {}",
                self.name,
                change.evicted.len(),
                self.matches.capacity()
            );
        }
        if change.inserted {
            self.on_match.dispatch(event);
        }
        change.inserted
    }

    fn remove(&mut self, event: &Event) -> bool {
        self.matches.remove(event)
    }

    fn discard(&mut self, event: &Event) -> bool {
        self.matches.remove(event)
    }

    fn retain_matches(&mut self, keep: &mut dyn FnMut(&Event) -> bool) -> Vec<Event> {
        self.matches.retain(|e| keep(e))
    }

    fn match_set(&self) -> &MatchWindow {
        &self.matches
    }

    fn clear(&mut self) {
        self.matches.clear();
    }
}
