// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, ordered match window
//!
//! Holds the events an expression currently considers matched, sorted by the
//! event total order. Once the window grows past its capacity the earliest
//! events are evicted silently; callers that cannot tolerate loss must size
//! the capacity above the number of concurrently live matches.

use super::listener::{Listener, ListenerRegistry};
use crate::core::error::{CombinatorError, CombinatorResult};
use crate::core::event::Event;
use std::collections::BTreeSet;

/// Membership change reported to window listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Added(Event),
    Removed(Event),
    Evicted(Event),
}

/// Outcome of [`MatchWindow::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowChange {
    /// The event was not present before and is present now.
    pub inserted: bool,
    /// Events pushed out to respect the capacity (may include the added event).
    pub evicted: Vec<Event>,
}

#[derive(Debug, Clone)]
pub struct MatchWindow {
    events: BTreeSet<Event>,
    capacity: usize,
    listeners: ListenerRegistry<WindowEvent>,
}

impl MatchWindow {
    pub fn new(capacity: usize) -> CombinatorResult<Self> {
        if capacity == 0 {
            return Err(CombinatorError::configuration_with_key(
                "match window capacity must be at least 1",
                "match.capacity",
            ));
        }
        Ok(Self {
            events: BTreeSet::new(),
            capacity,
            listeners: ListenerRegistry::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn add(&mut self, event: Event) -> WindowChange {
        if self.events.contains(&event) {
            return WindowChange::default();
        }
        self.events.insert(event.clone());
        self.listeners.dispatch(&WindowEvent::Added(event.clone()));

        let mut evicted = Vec::new();
        while self.events.len() > self.capacity {
            if let Some(oldest) = self.events.pop_first() {
                self.listeners.dispatch(&WindowEvent::Evicted(oldest.clone()));
                evicted.push(oldest);
            }
        }

        WindowChange {
            inserted: !evicted.contains(&event),
            evicted,
        }
    }

    /// Remove an event. Absent events are ignored.
    pub fn remove(&mut self, event: &Event) -> bool {
        if self.events.remove(event) {
            self.listeners.dispatch(&WindowEvent::Removed(event.clone()));
            true
        } else {
            false
        }
    }

    /// Keep only events satisfying `keep`; returns what was dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        let dropped: Vec<Event> = self.events.iter().filter(|e| !keep(*e)).cloned().collect();
        for event in &dropped {
            self.remove(event);
        }
        dropped
    }

    pub fn clear(&mut self) -> Vec<Event> {
        let dropped: Vec<Event> = std::mem::take(&mut self.events).into_iter().collect();
        for event in &dropped {
            self.listeners.dispatch(&WindowEvent::Removed(event.clone()));
        }
        dropped
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.events.contains(event)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Earliest event in the window.
    pub fn first(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Latest event in the window.
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Ascending iteration.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Event> + '_ {
        self.events.iter()
    }

    pub fn to_vec(&self) -> Vec<Event> {
        self.events.iter().cloned().collect()
    }

    pub fn add_listener(&mut self, listener: Listener<WindowEvent>) -> bool {
        self.listeners.register(listener)
    }

    pub fn remove_listener(&mut self, listener: &Listener<WindowEvent>) -> bool {
        self.listeners.unregister(listener)
    }
}

impl<'a> IntoIterator for &'a MatchWindow {
    type Item = &'a Event;
    type IntoIter = std::collections::btree_set::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            MatchWindow::new(0),
            Err(CombinatorError::Configuration { .. })
        ));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut window = MatchWindow::new(4).unwrap();
        let e1 = Event::atomic(1, 10);
        assert!(window.add(e1.clone()).inserted);
        assert!(!window.add(e1.clone()).inserted);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_oldest_evicted_over_capacity() {
        let mut window = MatchWindow::new(2).unwrap();
        let e1 = Event::atomic(1, 10);
        let e2 = Event::atomic(2, 20);
        let e3 = Event::atomic(3, 30);
        window.add(e1.clone());
        window.add(e2.clone());
        let change = window.add(e3.clone());

        assert!(change.inserted);
        assert_eq!(change.evicted, vec![e1.clone()]);
        assert!(!window.contains(&e1));
        assert_eq!(window.first(), Some(&e2));
        assert_eq!(window.last(), Some(&e3));
    }

    #[test]
    fn test_late_event_evicts_itself_when_full() {
        let mut window = MatchWindow::new(1).unwrap();
        let e2 = Event::atomic(2, 20);
        let e1 = Event::atomic(1, 10);
        window.add(e2.clone());
        let change = window.add(e1.clone());

        assert!(!change.inserted);
        assert_eq!(change.evicted, vec![e1]);
        assert_eq!(window.to_vec(), vec![e2]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut window = MatchWindow::new(2).unwrap();
        assert!(!window.remove(&Event::atomic(1, 1)));
    }

    #[test]
    fn test_listeners_observe_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let mut window = MatchWindow::new(1).unwrap();
        window.add_listener(Arc::new(move |change: &WindowEvent| {
            s.lock().unwrap().push(change.clone())
        }));

        let e1 = Event::atomic(1, 10);
        let e2 = Event::atomic(2, 20);
        window.add(e1.clone());
        window.add(e2.clone());
        window.remove(&e2);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                WindowEvent::Added(e1.clone()),
                WindowEvent::Added(e2.clone()),
                WindowEvent::Evicted(e1),
                WindowEvent::Removed(e2),
            ]
        );
    }

    #[test]
    fn test_retain_reports_dropped() {
        let mut window = MatchWindow::new(8).unwrap();
        for i in 0..5 {
            window.add(Event::atomic(i, i as i64 * 10));
        }
        let dropped = window.retain(|e| e.timestamp() >= 20);
        assert_eq!(dropped.len(), 2);
        assert_eq!(window.len(), 3);
        assert_eq!(window.first().map(|e| e.timestamp()), Some(20));
    }
}
