//! Publish/subscribe channel for authorization status events.
//!
//! Decouples the client from whatever renders notifications. Handlers are
//! registered per [`StatusKind`] and invoked synchronously on emission.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use garage_domain::{StatusEvent, StatusKind};
use parking_lot::Mutex;

type Handler = Arc<dyn Fn(&StatusEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    handlers: BTreeMap<u64, (StatusKind, Handler)>,
}

/// In-process status event bus.
#[derive(Default)]
pub struct StatusEventBus {
    registry: Arc<Mutex<Registry>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for StatusEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusEventBus")
            .field("subscribers", &self.registry.lock().handlers.len())
            .finish()
    }
}

impl StatusEventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// The handler stays registered until [`Subscription::unsubscribe`] is
    /// called; dropping the subscription does not remove it.
    pub fn subscribe<F>(&self, kind: StatusKind, handler: F) -> Subscription
    where
        F: Fn(&StatusEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .lock()
            .handlers
            .insert(id, (kind, Arc::new(handler)));
        Subscription {
            id,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Delivers `event` once to every current subscriber of its kind.
    ///
    /// Handlers run after the registry lock is released, so a handler may
    /// subscribe or unsubscribe without deadlocking.
    pub fn emit(&self, event: &StatusEvent) {
        let handlers: Vec<Handler> = self
            .registry
            .lock()
            .handlers
            .values()
            .filter(|(kind, _)| *kind == event.kind)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        tracing::debug!(kind = ?event.kind, subscribers = handlers.len(), "emitting status event");
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of handlers registered for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: StatusKind) -> usize {
        self.registry
            .lock()
            .handlers
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

/// Handle returned by [`StatusEventBus::subscribe`].
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Subscription {
    /// Removes the handler from the bus.
    pub fn unsubscribe(self) {
        self.registry.lock().handlers.remove(&self.id);
    }
}
