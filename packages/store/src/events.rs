//! # Typed event hub with scoped subscriptions
//!
//! [`EventHub`] is the observer used for every live feed in the app: the
//! identity service publishes auth-state changes through one, and the memory
//! store publishes collection snapshots through one per collection path.
//!
//! A subscriber holds a [`Subscription`], which is a [`Stream`] of events.
//! Dropping the subscription unregisters it from the hub, so a listener's
//! lifetime is exactly the lifetime of the value the consumer holds. Dropping
//! every clone of the hub ends all open subscriptions (their streams yield
//! `None`).

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::lock;

struct Registry<T> {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            senders: HashMap::new(),
        }
    }
}

/// Fan-out publisher of `T` events.
pub struct EventHub<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for EventHub<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for EventHub<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }
}

impl<T: Clone> EventHub<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    pub fn subscribe(&self) -> Subscription<T> {
        self.register(None)
    }

    /// Register a new listener whose stream starts with `initial`.
    ///
    /// Only this listener sees `initial`; existing listeners are untouched.
    pub fn subscribe_with(&self, initial: T) -> Subscription<T> {
        self.register(Some(initial))
    }

    fn register(&self, initial: Option<T>) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(event) = initial {
            // The receiver is alive in this scope, the send cannot fail.
            let _ = tx.send(event);
        }
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.senders.insert(id, tx);
        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every live listener. Returns how many received it.
    pub fn emit(&self, event: T) -> usize {
        let mut registry = lock(&self.registry);
        let mut closed = Vec::new();
        let mut delivered = 0;
        for (id, tx) in &registry.senders {
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*id);
            }
        }
        for id in closed {
            registry.senders.remove(&id);
        }
        delivered
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.registry).senders.len()
    }
}

/// A live listener on an [`EventHub`]. Unsubscribes on drop.
pub struct Subscription<T> {
    id: u64,
    rx: mpsc::UnboundedReceiver<T>,
    registry: Weak<Mutex<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Wait for the next event. `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).senders.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_emit_reaches_every_listener() {
        let hub = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.emit(7), 2);
        assert_eq!(a.recv().await, Some(7));
        assert_eq!(b.next().await, Some(7));
    }

    #[tokio::test]
    async fn test_initial_event_is_private() {
        let hub = EventHub::new();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe_with("hello".to_string());

        hub.emit("broadcast".to_string());
        assert_eq!(second.recv().await.as_deref(), Some("hello"));
        assert_eq!(second.recv().await.as_deref(), Some("broadcast"));
        assert_eq!(first.recv().await.as_deref(), Some("broadcast"));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub: EventHub<u32> = EventHub::new();
        let sub = hub.subscribe();
        let _other = hub.subscribe();
        assert_eq!(hub.listener_count(), 2);

        drop(sub);
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(hub.emit(1), 1);
    }

    #[tokio::test]
    async fn test_dropping_hub_ends_stream() {
        let hub: EventHub<u32> = EventHub::new();
        let mut sub = hub.subscribe();
        hub.emit(3);
        drop(hub);

        assert_eq!(sub.recv().await, Some(3));
        assert_eq!(sub.recv().await, None);
    }
}
