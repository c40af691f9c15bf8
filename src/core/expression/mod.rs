// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component expressions and the composites that combine them.

pub mod and_expression;
mod combination_builder;
pub mod combinator;
pub mod component;
pub mod composite_runtime;
pub mod notification;
pub mod predicate_expression;
pub mod sequence_expression;
pub mod strict_sequence_expression;

pub use and_expression::AndCore;
pub use combinator::{CombinatorCore, CombinatorKind, CompositeState};
pub use component::ComponentExpression;
pub use composite_runtime::{
    AndExpression, ComponentSnapshot, CompositeRuntime, ExpressionSnapshot, SequenceExpression,
    StrictSequenceExpression,
};
pub use notification::{
    Combination, CondensedCombination, ExpressionId, MatchNotification, MatchPart,
};
pub use predicate_expression::{Predicate, PredicateExpression};
pub use sequence_expression::{AdjacencyRule, SequenceCore, TemporalOrder};
pub use strict_sequence_expression::{ContextSet, Contiguity};
