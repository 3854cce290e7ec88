//! Broadcaster - a publish/subscribe registry that pushes values to listeners.
//!
//! Listeners are registered under a [`SubscriptionId`] token and receive
//! every published value in registration order. Delivery is isolated per
//! listener: a listener that returns an error or panics is logged and
//! skipped, and the remaining listeners still receive the value.

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Error a listener may report. It never reaches the publisher.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a single delivery.
pub type ListenerResult = Result<(), ListenerError>;

type Listener<T> = Box<dyn FnMut(&T) -> ListenerResult>;

/// Token returned by [`Broadcaster::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Registry of listeners for values of type `T`.
pub struct Broadcaster<T> {
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: u64,
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> std::fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> Broadcaster<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, delivering `current` to it immediately.
    ///
    /// The initial delivery happens before this call returns, so a late
    /// subscriber needs no separate fetch of the current value.
    pub fn subscribe<F>(&mut self, current: &T, listener: F) -> SubscriptionId
    where
        F: FnMut(&T) -> ListenerResult + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let mut listener: Listener<T> = Box::new(listener);
        deliver(id, &mut listener, current);
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        before != self.listeners.len()
    }

    /// Deliver `value` to every listener in registration order.
    ///
    /// Returns the number of listeners that accepted the value.
    pub fn publish(&mut self, value: &T) -> usize {
        let mut delivered = 0;
        for (id, listener) in &mut self.listeners {
            if deliver(*id, listener, value) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.listeners.iter().any(|(sid, _)| *sid == id)
    }
}

fn deliver<T>(id: SubscriptionId, listener: &mut Listener<T>, value: &T) -> bool {
    match catch_unwind(AssertUnwindSafe(|| (*listener)(value))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(subscription = id.0, "listener failed: {e}");
            false
        }
        Err(_) => {
            tracing::warn!(subscription = id.0, "listener panicked");
            false
        }
    }
}
