// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recursive enumeration of sequence combinations
//!
//! `build(sets[0..k], tail)`:
//! - no sets left: the single combination `[tail]` (or `[]` without a tail);
//! - otherwise every event of the last set that may precede `tail` becomes a
//!   root, combinations over `sets[0..k-1]` ending in that root are built
//!   recursively, and `tail` is appended to each.
//!
//! Recursion depth equals the sequence length, fixed at construction. The
//! output is bounded by the product of the window capacities, which is what
//! keeps per-component capacities meaningful.

use super::notification::Combination;
use crate::core::event::Event;
use crate::core::window::MatchWindow;

pub(crate) fn build_combinations<F>(
    sets: &[&MatchWindow],
    tail: Option<&Event>,
    precedes: &F,
) -> Vec<Combination>
where
    F: Fn(&Event, &Event) -> bool,
{
    let Some((last, earlier)) = sets.split_last() else {
        return vec![Combination::new(tail.into_iter().cloned().collect())];
    };

    let mut combinations = Vec::new();
    let roots = last
        .iter()
        .filter(|root| tail.map_or(true, |t| precedes(*root, t)));
    for root in roots {
        for mut combination in build_combinations(earlier, Some(root), precedes) {
            if let Some(t) = tail {
                combination.push(t.clone());
            }
            combinations.push(combination);
        }
    }
    combinations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: u64, ts: i64) -> Event {
        Event::atomic(id, ts)
    }

    fn window(events: &[Event]) -> MatchWindow {
        let mut w = MatchWindow::new(16).unwrap();
        for e in events {
            w.add(e.clone());
        }
        w
    }

    fn before(a: &Event, b: &Event) -> bool {
        a.is_before(b)
    }

    #[test]
    fn test_no_sets_yields_tail() {
        let tail = ev(1, 10);
        let combos = build_combinations(&[], Some(&tail), &before);
        assert_eq!(combos, vec![Combination::new(vec![tail])]);
        assert_eq!(
            build_combinations(&[], None, &before),
            vec![Combination::default()]
        );
    }

    #[test]
    fn test_roots_must_precede_tail() {
        let s0 = window(&[ev(1, 10), ev(2, 20), ev(3, 30)]);
        let tail = ev(4, 25);
        let combos = build_combinations(&[&s0], Some(&tail), &before);
        assert_eq!(
            combos,
            vec![
                Combination::new(vec![ev(1, 10), tail.clone()]),
                Combination::new(vec![ev(2, 20), tail.clone()]),
            ]
        );
    }

    #[test]
    fn test_concurrent_events_do_not_precede() {
        let s0 = window(&[ev(1, 10)]);
        let tail = ev(2, 10);
        assert!(build_combinations(&[&s0], Some(&tail), &before).is_empty());
    }

    #[test]
    fn test_three_level_chain() {
        let s0 = window(&[ev(1, 10), ev(2, 20)]);
        let s1 = window(&[ev(3, 15), ev(4, 25)]);
        let tail = ev(5, 30);
        let combos = build_combinations(&[&s0, &s1], Some(&tail), &before);
        // 1-3-5, 1-4-5, 2-4-5
        assert_eq!(combos.len(), 3);
        assert!(combos
            .iter()
            .all(|c| c.events().windows(2).all(|w| w[0].is_before(&w[1]))));
    }

    #[test]
    fn test_without_tail_enumerates_every_chain() {
        let s0 = window(&[ev(1, 10), ev(2, 20)]);
        let s1 = window(&[ev(3, 30)]);
        let combos = build_combinations(&[&s0, &s1], None, &before);
        assert_eq!(
            combos,
            vec![
                Combination::new(vec![ev(1, 10), ev(3, 30)]),
                Combination::new(vec![ev(2, 20), ev(3, 30)]),
            ]
        );
    }
}
