//! Document level listeners (keyboard, outside clicks) as scoped subscriptions.
//!
//! `subscribe` hands back a [`Subscription`] guard and the listener lives exactly as long as
//! the guard does. The player keeps guards in the state they belong to, so closing a menu or
//! the player itself tears its listeners down with it.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::controls::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentEventKind {
    KeyDown,
    Click,
    MouseDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    KeyDown(Key),
    Click,
    MouseDown,
}

impl DocumentEvent {
    pub fn kind(&self) -> DocumentEventKind {
        match self {
            Self::KeyDown(_) => DocumentEventKind::KeyDown,
            Self::Click => DocumentEventKind::Click,
            Self::MouseDown => DocumentEventKind::MouseDown,
        }
    }
}

type Handler = Arc<dyn Fn(&DocumentEvent) + Send + Sync>;

struct Listener {
    kind: DocumentEventKind,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    // ordered by id so listeners run in registration order
    listeners: BTreeMap<u64, Listener>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // a panicking handler never holds the lock, the map is still consistent
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The document the player is mounted in. Cheap to clone, clones share listeners.
#[derive(Clone, Default)]
pub struct DocumentEvents {
    registry: Arc<Mutex<Registry>>,
}

impl DocumentEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: DocumentEventKind, handler: F) -> Subscription
    where
        F: Fn(&DocumentEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(
            id,
            Listener {
                kind,
                handler: Arc::new(handler),
            },
        );

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// runs every listener for the event's kind, returns how many ran
    pub fn dispatch(&self, event: &DocumentEvent) -> usize {
        // handlers are cloned out so they can (un)subscribe without deadlocking
        let handlers: Vec<Handler> = lock(&self.registry)
            .listeners
            .values()
            .filter(|listener| listener.kind == event.kind())
            .map(|listener| listener.handler.clone())
            .collect();

        for handler in &handlers {
            handler(event);
        }

        handlers.len()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    pub fn listener_count_for(&self, kind: DocumentEventKind) -> usize {
        lock(&self.registry)
            .listeners
            .values()
            .filter(|listener| listener.kind == kind)
            .count()
    }
}

/// Keeps one listener registered. Dropping it (or calling `unsubscribe`) removes the listener.
#[must_use = "dropping a subscription unsubscribes it immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
