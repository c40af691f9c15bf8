// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod expression_config;

pub use expression_config::{
    CombinatorSettings, FlatConfig, PropertySource, KEY_COMPLEX, KEY_COMPOSITE_CAPACITY,
    KEY_MATCH_CAPACITY, KEY_SINGLE_EVENT,
};
