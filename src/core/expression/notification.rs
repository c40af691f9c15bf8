// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match notifications
//!
//! A notification only ever describes combinations introduced by its
//! triggering event, never the accumulated set. AND composites report
//! condensed combinations (cross-product templates); sequence composites
//! report explicitly enumerated combinations.

use crate::core::error::CombinatorResult;
use crate::core::event::Event;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Identity of a composite expression.
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionId {
    pub uuid: Uuid,
    pub name: String,
}

impl ExpressionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl PartialEq for ExpressionId {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for ExpressionId {}

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.uuid)
    }
}

/// One event per component, in component order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Combination(Vec<Event>);

impl Combination {
    pub fn new(events: Vec<Event>) -> Self {
        Self(events)
    }

    pub fn events(&self) -> &[Event] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.0.contains(event)
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.0.push(event);
    }
}

impl From<Vec<Event>> for Combination {
    fn from(events: Vec<Event>) -> Self {
        Self(events)
    }
}

/// Cross-product template: each slot lists the candidates for one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CondensedCombination(Vec<Vec<Event>>);

impl CondensedCombination {
    pub fn new(slots: Vec<Vec<Event>>) -> Self {
        Self(slots)
    }

    pub fn slots(&self) -> &[Vec<Event>] {
        &self.0
    }

    /// Number of combinations the template stands for.
    pub fn cardinality(&self) -> usize {
        self.0.iter().map(Vec::len).product()
    }

    /// True when some slot has no candidates, so the template denotes nothing.
    pub fn is_empty(&self) -> bool {
        self.0.iter().any(Vec::is_empty)
    }

    /// Materialize the cross product, slot 0 varying slowest.
    pub fn expand(&self) -> Vec<Combination> {
        let mut out = vec![Combination::default()];
        for slot in &self.0 {
            let mut next = Vec::with_capacity(out.len() * slot.len());
            for prefix in &out {
                for event in slot {
                    let mut combination = prefix.clone();
                    combination.push(event.clone());
                    next.push(combination);
                }
            }
            out = next;
        }
        out
    }
}

/// Payload of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MatchPart {
    /// The triggering event alone.
    Event(Event),
    /// Explicitly enumerated combinations (sequence composites).
    Combinations(Vec<Combination>),
    /// Condensed cross-product templates (AND composites).
    ///
    /// Templates are disjoint: the one collapsing slot `k` to the trigger also
    /// leaves the trigger out of every slot before `k`. Read the payload
    /// through [`MatchNotification::combinations`] rather than assuming each
    /// template is a full cross-product.
    Condensed(Vec<CondensedCombination>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchNotification {
    pub source: ExpressionId,
    pub trigger: Event,
    pub part: MatchPart,
}

impl MatchNotification {
    pub fn new(source: ExpressionId, trigger: Event, part: MatchPart) -> Self {
        Self {
            source,
            trigger,
            part,
        }
    }

    /// Whether this is a combination notification rather than the single-event one.
    pub fn is_complex(&self) -> bool {
        !matches!(self.part, MatchPart::Event(_))
    }

    /// Explicit, distinct combinations described by the notification.
    ///
    /// Single-event notifications describe no combination.
    pub fn combinations(&self) -> Vec<Combination> {
        match &self.part {
            MatchPart::Event(_) => Vec::new(),
            MatchPart::Combinations(combinations) => {
                let mut seen = BTreeSet::new();
                combinations
                    .iter()
                    .filter(|c| seen.insert((*c).clone()))
                    .cloned()
                    .collect()
            }
            MatchPart::Condensed(condensed) => condensed
                .iter()
                .flat_map(CondensedCombination::expand)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    pub fn combination_count(&self) -> usize {
        self.combinations().len()
    }

    pub fn to_json(&self) -> CombinatorResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: u64) -> Event {
        Event::atomic(id, id as i64 * 10)
    }

    #[test]
    fn test_expand_cross_product() {
        let condensed = CondensedCombination::new(vec![vec![ev(1), ev(2)], vec![ev(3)]]);
        assert_eq!(condensed.cardinality(), 2);
        assert_eq!(
            condensed.expand(),
            vec![
                Combination::new(vec![ev(1), ev(3)]),
                Combination::new(vec![ev(2), ev(3)]),
            ]
        );
    }

    #[test]
    fn test_empty_slot_denotes_nothing() {
        let condensed = CondensedCombination::new(vec![vec![ev(1)], vec![]]);
        assert!(condensed.is_empty());
        assert!(condensed.expand().is_empty());
    }

    #[test]
    fn test_condensed_combinations_are_deduplicated() {
        let id = ExpressionId::new("and");
        let overlapping = MatchPart::Condensed(vec![
            CondensedCombination::new(vec![vec![ev(2)], vec![ev(1), ev(2)]]),
            CondensedCombination::new(vec![vec![ev(1), ev(2)], vec![ev(2)]]),
        ]);
        let notification = MatchNotification::new(id, ev(2), overlapping);
        assert!(notification.is_complex());
        assert_eq!(notification.combination_count(), 3);
    }

    #[test]
    fn test_single_event_notification_has_no_combinations() {
        let notification =
            MatchNotification::new(ExpressionId::new("x"), ev(1), MatchPart::Event(ev(1)));
        assert!(!notification.is_complex());
        assert!(notification.combinations().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let notification = MatchNotification::new(
            ExpressionId::new("seq"),
            ev(2),
            MatchPart::Combinations(vec![Combination::new(vec![ev(1), ev(2)])]),
        );
        let value: serde_json::Value =
            serde_json::from_str(&notification.to_json().unwrap()).unwrap();
        assert_eq!(value["source"]["name"], "seq");
        assert_eq!(value["part"]["type"], "combinations");
        assert_eq!(value["part"]["value"][0][1]["id"], 2);
    }
}
