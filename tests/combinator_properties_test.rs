// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invariants checked over pseudo-random add/remove streams.
//!
//! Streams are generated from a fixed seed so failures reproduce.

use eventflux_combinators::core::expression::ComponentExpression;
use eventflux_combinators::{
    AndExpression, Combination, Event, PredicateExpression, SequenceExpression,
    StrictSequenceExpression,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

mod common;
use common::{always, ev, init_logging, of_type, typed};

const KINDS: [&str; 3] = ["A", "B", "C"];

fn random_stream(rng: &mut StdRng, len: u64) -> Vec<Event> {
    (1..=len)
        .map(|id| typed(id, rng.gen_range(0..40), KINDS[rng.gen_range(0..KINDS.len())]))
        .collect()
}

fn modulo(name: &str, modulus: u64, capacity: usize) -> Box<dyn ComponentExpression> {
    PredicateExpression::new(name, capacity, move |e| e.id().0 % modulus == 0)
        .expect("valid capacity")
        .boxed()
}

/// Checks the left-to-right chain over a snapshot of match sets.
fn assert_chain(sets: &[Vec<Event>]) {
    for i in 1..sets.len() {
        if sets[i - 1].is_empty() {
            assert!(sets[i].is_empty(), "slot {i} non-empty after empty slot");
            continue;
        }
        let floor = &sets[i - 1][0];
        for m in &sets[i] {
            assert!(floor.is_before(m), "slot {i} holds {m} not after floor {floor}");
        }
    }
}

/// Checks contiguity against the set of events still live.
fn assert_contiguous(sets: &[Vec<Event>], live: &BTreeSet<Event>) {
    let atoms: BTreeSet<_> = live.iter().flat_map(|e| e.atoms().iter().cloned()).collect();
    for i in 1..sets.len() {
        for m in &sets[i] {
            let predecessor = atoms.range(..m.first().clone()).next_back();
            assert!(
                predecessor.is_some_and(|p| {
                    sets[i - 1].iter().any(|r| r.last() == p && r.is_before(m))
                }),
                "slot {i} holds {m} without a contiguous predecessor"
            );
        }
    }
}

#[test]
fn test_sequence_chain_holds_under_random_operations() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let expr = SequenceExpression::new(
            "abc",
            vec![of_type("A", 4), of_type("B", 4), of_type("C", 4)],
        )
        .expect("valid composite");
        let stream = random_stream(&mut rng, 40);
        let mut live = Vec::new();
        for event in stream {
            if !live.is_empty() && rng.gen_bool(0.3) {
                let victim: Event = live.swap_remove(rng.gen_range(0..live.len()));
                expr.remove(&victim);
            } else {
                expr.add(&event);
                live.push(event);
            }
            let sets = expr.match_sets();
            assert_chain(&sets);
            assert_eq!(expr.is_true(), !sets[2].is_empty());
        }
    }
}

#[test]
fn test_strict_sequence_contiguity_holds_under_random_operations() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let expr = StrictSequenceExpression::new("ab", vec![of_type("A", 8), of_type("B", 8)])
            .expect("valid composite");
        let mut live = BTreeSet::new();
        for event in random_stream(&mut rng, 40) {
            if !live.is_empty() && rng.gen_bool(0.25) {
                let index = rng.gen_range(0..live.len());
                let victim = live.iter().nth(index).cloned().expect("index in range");
                live.remove(&victim);
                expr.remove(&victim);
            } else {
                live.insert(event.clone());
                expr.add(&event);
            }
            let sets = expr.match_sets();
            assert_chain(&sets);
            assert_contiguous(&sets, &live);
        }
    }
}

#[test]
fn test_strict_combinations_are_sequence_combinations_under_timestamp_ties() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..20 {
        let strict = StrictSequenceExpression::new("ab", vec![of_type("A", 64), of_type("B", 64)])
            .expect("valid composite");
        let sequence = SequenceExpression::new("ab", vec![of_type("A", 64), of_type("B", 64)])
            .expect("valid composite");
        let mut reported = Vec::new();
        for id in 1..=30 {
            // Few distinct timestamps, so neighbours often tie.
            let event = typed(id, rng.gen_range(0..6), KINDS[rng.gen_range(0..2)]);
            sequence.add(&event);
            for notification in strict.add(&event) {
                reported.extend(notification.combinations());
            }
        }
        let valid: BTreeSet<_> = sequence.current_combinations().into_iter().collect();
        for combination in reported.iter().chain(strict.current_combinations().iter()) {
            let events = combination.events();
            assert!(
                events.windows(2).all(|pair| pair[0].is_before(&pair[1])),
                "strict reported concurrent events {events:?}"
            );
            assert!(valid.contains(combination), "{events:?} is not a sequence combination");
        }
    }
}

#[test]
fn test_and_notifications_partition_the_cross_product() {
    init_logging();
    let expr = AndExpression::new(
        "mod",
        vec![modulo("two", 2, 64), modulo("three", 3, 64), always("any", 64)],
    )
    .expect("valid composite");

    let mut reported: Vec<Combination> = Vec::new();
    for id in 1..=24 {
        for notification in expr.add(&ev(id)) {
            reported.extend(notification.combinations());
        }
    }

    let distinct: BTreeSet<_> = reported.iter().cloned().collect();
    assert_eq!(distinct.len(), reported.len(), "a combination was reported twice");
    let current: BTreeSet<_> = expr.current_combinations().into_iter().collect();
    assert_eq!(distinct, current);
    // 12 multiples of two, 8 of three, 24 events.
    assert_eq!(current.len(), 12 * 8 * 24);
}

#[test]
fn test_sequence_notifications_cover_every_chain_once() {
    let expr = SequenceExpression::new(
        "seq",
        vec![always("a", 64), always("b", 64), always("c", 64)],
    )
    .expect("valid composite");

    let mut reported = Vec::new();
    for id in 1..=8 {
        for notification in expr.add(&ev(id)) {
            reported.extend(notification.combinations());
        }
    }
    let distinct: BTreeSet<_> = reported.iter().cloned().collect();
    assert_eq!(distinct.len(), reported.len());
    assert_eq!(distinct.len(), 56);
    let current: BTreeSet<_> = expr.current_combinations().into_iter().collect();
    assert_eq!(distinct, current);
}

#[test]
fn test_duplicate_delivery_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(3);
    let expr = SequenceExpression::new("ab", vec![of_type("A", 8), of_type("B", 8)])
        .expect("valid composite");
    for event in random_stream(&mut rng, 30) {
        expr.add(&event);
        let before = expr.match_sets();
        let triggers = expr.triggers();
        assert!(expr.add(&event).is_empty());
        assert_eq!(expr.match_sets(), before);
        assert_eq!(expr.triggers(), triggers);
    }
}

#[test]
fn test_removal_never_grows_match_sets() {
    let mut rng = StdRng::seed_from_u64(5);
    let and = AndExpression::new("and", vec![of_type("A", 8), of_type("B", 8), of_type("C", 8)])
        .expect("valid composite");
    let seq = StrictSequenceExpression::new("seq", vec![of_type("A", 8), of_type("B", 8)])
        .expect("valid composite");
    let stream = random_stream(&mut rng, 30);
    for event in &stream {
        and.add(event);
        seq.add(event);
    }
    for event in &stream {
        let and_before = and.match_sets();
        let seq_before = seq.match_sets();
        and.remove(event);
        seq.remove(event);
        for (after, before) in and.match_sets().iter().zip(&and_before) {
            assert!(after.iter().all(|e| before.contains(e)));
            assert!(!after.contains(event));
        }
        for (after, before) in seq.match_sets().iter().zip(&seq_before) {
            assert!(after.iter().all(|e| before.contains(e)));
        }
    }
    assert!(and.match_sets().iter().all(Vec::is_empty));
    assert!(!seq.is_true());
}

#[test]
fn test_removing_absent_event_is_noop() {
    let expr = AndExpression::new("and", vec![always("a", 4), always("b", 4)])
        .expect("valid composite");
    expr.add(&ev(1));
    let before = expr.snapshot();
    assert!(!expr.remove(&ev(99)));
    let after = expr.snapshot();
    assert_eq!(before.components.len(), after.components.len());
    for (b, a) in before.components.iter().zip(&after.components) {
        assert_eq!(b.matches, a.matches);
    }
    assert_eq!(before.triggers, after.triggers);
}
