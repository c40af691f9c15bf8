// SPDX-License-Identifier: MIT OR Apache-2.0

//! Combinatorial pattern matching over event streams.
//!
//! Leaf [`PredicateExpression`]s match single events into bounded match
//! windows. Composites combine them:
//!
//! - [`AndExpression`]: every component holds a match, in any order;
//! - [`SequenceExpression`]: component matches follow each other in time;
//! - [`StrictSequenceExpression`]: as a sequence, with no live event in between.
//!
//! Each composite reports only the combinations a new event introduces.

pub mod core;

pub use crate::core::config::{CombinatorSettings, FlatConfig, PropertySource};
pub use crate::core::error::{CombinatorError, CombinatorResult};
pub use crate::core::event::{Activity, AtomicEvent, AttributeValue, Event, EventId, EventKind};
pub use crate::core::expression::{
    AndExpression, Combination, CombinatorKind, ComponentExpression, CompositeState,
    CondensedCombination, ExpressionId, ExpressionSnapshot, MatchNotification, MatchPart,
    PredicateExpression, SequenceExpression, StrictSequenceExpression,
};
pub use crate::core::sink::{CollectingSink, LogSink};
pub use crate::core::window::{Listener, MatchWindow};
