// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered listener registry
//!
//! Listeners are shared callback handles. Dispatch follows registration
//! order, registering a handle that is already present is a no-op, and
//! unregistration matches by handle identity rather than by behaviour.

use std::fmt;
use std::sync::Arc;

/// A registered callback.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub struct ListenerRegistry<T> {
    listeners: Vec<Listener<T>>,
}

impl<T> ListenerRegistry<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener. Returns `false` if this exact handle is already registered.
    pub fn register(&mut self, listener: Listener<T>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Remove a listener by identity. Returns `false` if it was not registered.
    pub fn unregister(&mut self, listener: &Listener<T>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: &Listener<T>) -> bool {
        self.listeners.iter().any(|l| Arc::ptr_eq(l, listener))
    }

    /// Invoke every listener in registration order.
    pub fn dispatch(&self, value: &T) {
        for listener in &self.listeners {
            listener(value);
        }
    }

    /// Copy of the current handles, for dispatching outside a lock.
    pub fn snapshot(&self) -> Vec<Listener<T>> {
        self.listeners.clone()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ListenerRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<T> fmt::Debug for ListenerRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
