// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::expression::MatchNotification;
use crate::core::window::Listener;
use std::sync::Arc;

/// Debug sink that writes every notification to the `log` facade as JSON.
#[derive(Debug, Clone)]
pub struct LogSink {
    prefix: String,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    pub fn new() -> Self {
        Self::with_prefix("[LOG]")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Render one notification as it would be logged.
    pub fn format(&self, notification: &MatchNotification) -> String {
        match notification.to_json() {
            Ok(json) => format!("{} {}", self.prefix, json),
            // Fall back to the debug form rather than dropping the line.
            Err(e) => {
                log::warn!("{} notification serialization failed: {}", self.prefix, e);
                format!("{} {:?}", self.prefix, notification)
            }
        }
    }

    pub fn publish(&self, notification: &MatchNotification) {
        log::info!("{}", self.format(notification));
    }

    pub fn listener(&self) -> Listener<MatchNotification> {
        let sink = self.clone();
        Arc::new(move |n: &MatchNotification| sink.publish(n))
    }
}
