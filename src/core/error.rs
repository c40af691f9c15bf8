// SPDX-License-Identifier: MIT OR Apache-2.0

//! Combinator Error Types
//!
//! Event processing itself never fails: adding or removing an event always
//! yields a well-defined state transition. Errors only surface while building
//! expressions, events and configuration.

use thiserror::Error;

/// Result type for combinator operations
pub type CombinatorResult<T> = Result<T, CombinatorError>;

/// Errors raised while constructing or configuring expressions
#[derive(Error, Debug)]
pub enum CombinatorError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        key: Option<String>,
    },

    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },

    #[error("Invalid expression '{expression:?}': {message}")]
    InvalidExpression {
        message: String,
        expression: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CombinatorError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: None,
        }
    }

    /// Create a configuration error tied to a specific key
    pub fn configuration_with_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create an invalid event error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Create an invalid expression error
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            message: message.into(),
            expression: None,
        }
    }

    /// Create an invalid expression error naming the offending expression
    pub fn invalid_expression_named(
        message: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self::InvalidExpression {
            message: message.into(),
            expression: Some(expression.into()),
        }
    }
}
