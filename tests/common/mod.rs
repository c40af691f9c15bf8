// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use eventflux_combinators::core::expression::ComponentExpression;
use eventflux_combinators::{AttributeValue, Event, PredicateExpression};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Atomic event whose timestamp is ten times its id.
pub fn ev(id: u64) -> Event {
    Event::atomic(id, id as i64 * 10)
}

/// Atomic event carrying a single type attribute.
pub fn typed(id: u64, timestamp: i64, kind: &str) -> Event {
    Event::atomic_with(id, timestamp, vec![AttributeValue::from(kind)])
}

pub fn always(name: &str, capacity: usize) -> Box<dyn ComponentExpression> {
    PredicateExpression::always(name, capacity)
        .expect("valid capacity")
        .boxed()
}

/// Matches events whose type attribute equals `kind`.
pub fn of_type(kind: &str, capacity: usize) -> Box<dyn ComponentExpression> {
    PredicateExpression::attribute_equals(kind, capacity, 0, kind)
        .expect("valid capacity")
        .boxed()
}

pub fn ids(events: &[Event]) -> Vec<u64> {
    events.iter().map(|e| e.id().0).collect()
}
