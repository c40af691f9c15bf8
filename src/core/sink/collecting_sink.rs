// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::core::expression::MatchNotification;
use crate::core::window::Listener;
use std::sync::{Arc, Mutex, MutexGuard};

/// Buffers notifications in memory, in delivery order.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    notifications: Arc<Mutex<Vec<MatchNotification>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MatchNotification>> {
        self.notifications.lock().unwrap_or_else(|poisoned| {
            log::error!("collecting sink mutex poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    pub fn publish(&self, notification: &MatchNotification) {
        self.lock().push(notification.clone());
    }

    /// Listener handle sharing this sink's buffer.
    pub fn listener(&self) -> Listener<MatchNotification> {
        let sink = self.clone();
        Arc::new(move |n: &MatchNotification| sink.publish(n))
    }

    pub fn notifications(&self) -> Vec<MatchNotification> {
        self.lock().clone()
    }

    /// Only the combination notifications.
    pub fn complex(&self) -> Vec<MatchNotification> {
        self.lock().iter().filter(|n| n.is_complex()).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn drain(&self) -> Vec<MatchNotification> {
        std::mem::take(&mut *self.lock())
    }
}
