// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered events and activities
//!
//! Events are immutable and cheap to clone (`Arc` inside). Two orderings are
//! involved:
//!
//! - `is_before` is the *temporal* relation: strict and non-reflexive, and two
//!   events whose timestamps overlap are concurrent (neither precedes the other).
//! - `Ord` is a total order consistent with `is_before`, with identity as the
//!   final tie-breaker. Match windows and the strict-sequence context set sort
//!   by it, so concurrent events still have a deterministic position.

use super::value::AttributeValue;
use crate::core::error::{CombinatorError, CombinatorResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Caller-assigned event identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Atomic,
    Activity,
}

/// A single observation at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicEvent {
    pub id: EventId,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeValue>,
}

impl AtomicEvent {
    pub fn new(id: u64, timestamp: i64) -> Self {
        Self {
            id: EventId(id),
            timestamp,
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(id: u64, timestamp: i64, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id: EventId(id),
            timestamp,
            attributes,
        }
    }

    pub fn attribute(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }
}

impl PartialEq for AtomicEvent {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.id == other.id
    }
}

impl Eq for AtomicEvent {}

impl Hash for AtomicEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.timestamp.hash(state);
        self.id.hash(state);
    }
}

impl PartialOrd for AtomicEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AtomicEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// A composite event spanning an ordered, non-empty run of atomic events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Activity {
    pub id: EventId,
    members: Vec<Arc<AtomicEvent>>,
}

impl Activity {
    /// Build an activity; members are sorted and de-duplicated.
    pub fn new(id: u64, mut members: Vec<Arc<AtomicEvent>>) -> CombinatorResult<Self> {
        if members.is_empty() {
            return Err(CombinatorError::invalid_event(format!(
                "activity #{id} must contain at least one atomic event"
            )));
        }
        members.sort();
        members.dedup();
        Ok(Self {
            id: EventId(id),
            members,
        })
    }

    pub fn members(&self) -> &[Arc<AtomicEvent>] {
        &self.members
    }

    pub fn first(&self) -> &Arc<AtomicEvent> {
        &self.members[0]
    }

    pub fn last(&self) -> &Arc<AtomicEvent> {
        &self.members[self.members.len() - 1]
    }
}

/// An event as seen by expressions: either atomic or an activity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Atomic(Arc<AtomicEvent>),
    Activity(Arc<Activity>),
}

impl Event {
    pub fn atomic(id: u64, timestamp: i64) -> Self {
        Event::Atomic(Arc::new(AtomicEvent::new(id, timestamp)))
    }

    pub fn atomic_with(id: u64, timestamp: i64, attributes: Vec<AttributeValue>) -> Self {
        Event::Atomic(Arc::new(AtomicEvent::with_attributes(
            id, timestamp, attributes,
        )))
    }

    /// Build an activity from the atoms of `parts` (nested activities are flattened).
    pub fn activity(id: u64, parts: &[Event]) -> CombinatorResult<Self> {
        let members = parts
            .iter()
            .flat_map(|p| p.atoms().iter().cloned())
            .collect();
        Ok(Event::Activity(Arc::new(Activity::new(id, members)?)))
    }

    pub fn id(&self) -> EventId {
        match self {
            Event::Atomic(a) => a.id,
            Event::Activity(a) => a.id,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Atomic(_) => EventKind::Atomic,
            Event::Activity(_) => EventKind::Activity,
        }
    }

    /// Earliest atomic event (the event itself when atomic).
    pub fn first(&self) -> &Arc<AtomicEvent> {
        match self {
            Event::Atomic(a) => a,
            Event::Activity(a) => a.first(),
        }
    }

    /// Latest atomic event (the event itself when atomic).
    pub fn last(&self) -> &Arc<AtomicEvent> {
        match self {
            Event::Atomic(a) => a,
            Event::Activity(a) => a.last(),
        }
    }

    pub fn atoms(&self) -> &[Arc<AtomicEvent>] {
        match self {
            Event::Atomic(a) => std::slice::from_ref(a),
            Event::Activity(a) => a.members(),
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.first().timestamp
    }

    /// Strict temporal precedence: this event ends before `other` starts.
    pub fn is_before(&self, other: &Event) -> bool {
        self.last().timestamp < other.first().timestamp
    }

    /// Distinct events that neither precede nor follow each other.
    pub fn is_concurrent_with(&self, other: &Event) -> bool {
        self != other && !self.is_before(other) && !other.is_before(self)
    }

    /// Attribute lookup on the first atomic event.
    pub fn attribute(&self, index: usize) -> Option<&AttributeValue> {
        self.first().attribute(index)
    }
}

/// Equal iff the total order says so: same bounds, kind and id.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.id().hash(state);
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.first()
            .cmp(other.first())
            .then_with(|| self.last().cmp(other.last()))
            .then_with(|| self.kind().cmp(&other.kind()))
            .then_with(|| self.id().cmp(&other.id()))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Atomic(a) => write!(f, "{}@{}", a.id, a.timestamp),
            Event::Activity(a) => write!(
                f,
                "{}[{}..{}]",
                a.id,
                a.first().timestamp,
                a.last().timestamp
            ),
        }
    }
}

impl From<AtomicEvent> for Event {
    fn from(a: AtomicEvent) -> Self {
        Event::Atomic(Arc::new(a))
    }
}

impl From<Activity> for Event {
    fn from(a: Activity) -> Self {
        Event::Activity(Arc::new(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_before_is_strict() {
        let e1 = Event::atomic(1, 10);
        let e2 = Event::atomic(2, 20);
        assert!(e1.is_before(&e2));
        assert!(!e2.is_before(&e1));
        assert!(!e1.is_before(&e1));
    }

    #[test]
    fn test_concurrent_events_are_distinct_but_unordered() {
        let a = Event::atomic(1, 10);
        let b = Event::atomic(2, 10);
        assert!(!a.is_before(&b));
        assert!(!b.is_before(&a));
        assert!(a.is_concurrent_with(&b));
        assert_ne!(a, b);
        // Total order still places them deterministically.
        assert!(a < b);
    }

    #[test]
    fn test_equality_follows_total_order() {
        assert_eq!(Event::atomic(1, 10), Event::atomic(1, 10));
        assert_ne!(Event::atomic(1, 10), Event::atomic(1, 20));
    }

    #[test]
    fn test_activity_first_last() {
        let parts = [
            Event::atomic(3, 30),
            Event::atomic(1, 10),
            Event::atomic(2, 20),
        ];
        let activity = Event::activity(100, &parts).unwrap();
        assert_eq!(activity.first().id, EventId(1));
        assert_eq!(activity.last().id, EventId(3));
        assert_eq!(activity.atoms().len(), 3);
        assert_eq!(activity.timestamp(), 10);
    }

    #[test]
    fn test_activity_precedence_uses_bounds() {
        let early = Event::activity(10, &[Event::atomic(1, 1), Event::atomic(2, 5)]).unwrap();
        let late = Event::atomic(3, 6);
        let overlapping = Event::atomic(4, 5);
        assert!(early.is_before(&late));
        assert!(!early.is_before(&overlapping));
    }

    #[test]
    fn test_empty_activity_rejected() {
        let result = Event::activity(1, &[]);
        assert!(matches!(result, Err(CombinatorError::InvalidEvent { .. })));
    }

    #[test]
    fn test_ordering_consistent_with_is_before() {
        let events = vec![
            Event::atomic(5, 50),
            Event::atomic(1, 10),
            Event::activity(9, &[Event::atomic(2, 20), Event::atomic(3, 30)]).unwrap(),
        ];
        let mut sorted = events.clone();
        sorted.sort();
        for pair in sorted.windows(2) {
            assert!(!pair[1].is_before(&pair[0]));
        }
    }

    #[test]
    fn test_serialize_event() {
        let e = Event::atomic_with(7, 70, vec![AttributeValue::from("login")]);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "atomic");
        assert_eq!(json["timestamp"], 70);
        assert_eq!(json["id"], 7);
    }
}
