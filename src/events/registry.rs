//! Listener registry with scoped subscriptions.
//!
//! # Responsibilities
//! - Register event listeners and hand back a [`Subscription`] guard
//! - Deliver each dispatched event to every live listener
//! - Remove a listener when its guard is dropped
//!
//! # Design Decisions
//! - Dropping the guard is the only way to unsubscribe, so a listener cannot
//!   outlive the scope that created it
//! - Guards hold a weak reference; a registry torn down first is not kept alive
//! - Listeners must not subscribe or unsubscribe from inside a dispatch

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::observability::metrics;

/// Callback invoked for each event.
pub type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

struct RegistryInner<T> {
    listeners: DashMap<u64, Listener<T>>,
    next_id: AtomicU64,
}

/// A set of live listeners for one event type.
pub struct ListenerRegistry<T> {
    inner: Arc<RegistryInner<T>>,
}

impl<T> ListenerRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                listeners: DashMap::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a listener. It stays live until the returned guard is dropped.
    pub fn subscribe(&self, listener: Listener<T>) -> Subscription<T> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.insert(id, listener);
        metrics::record_active_listeners(self.inner.listeners.len());
        tracing::debug!(listener_id = id, "Listener registered");

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every live listener. Returns how many ran.
    pub fn dispatch(&self, event: &T) -> usize {
        let mut delivered = 0;
        for entry in self.inner.listeners.iter() {
            (entry.value())(event);
            delivered += 1;
        }
        delivered
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.listeners.is_empty()
    }
}

impl<T> Clone for ListenerRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ListenerRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Guard for a registered listener; unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription<T> {
    id: u64,
    registry: Weak<RegistryInner<T>>,
}

impl<T> Subscription<T> {
    /// Identifier of the listener this guard owns.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.listeners.remove(&self.id);
            metrics::record_active_listeners(inner.listeners.len());
            tracing::debug!(listener_id = self.id, "Listener removed");
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_listener(counter: &Arc<AtomicUsize>) -> Listener<u32> {
        let counter = Arc::clone(counter);
        Box::new(move |value: &u32| {
            counter.fetch_add(*value as usize, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_reaches_live_listeners() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let _a = registry.subscribe(counting_listener(&counter));
        let _b = registry.subscribe(counting_listener(&counter));

        assert_eq!(registry.dispatch(&5), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let sub = registry.subscribe(counting_listener(&counter));
        assert_eq!(registry.len(), 1);

        drop(sub);
        assert!(registry.is_empty());
        assert_eq!(registry.dispatch(&1), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guard_outliving_registry() {
        let registry = ListenerRegistry::<u32>::new();
        let sub = registry.subscribe(Box::new(|_| {}));
        drop(registry);
        // Nothing left to unsubscribe from; must not panic.
        drop(sub);
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = ListenerRegistry::<u32>::new();
        let a = registry.subscribe(Box::new(|_| {}));
        let b = registry.subscribe(Box::new(|_| {}));
        assert_ne!(a.id(), b.id());
    }
}
