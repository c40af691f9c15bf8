// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod event;
pub mod value;

pub use event::{Activity, AtomicEvent, Event, EventId, EventKind};
pub use value::AttributeValue;
