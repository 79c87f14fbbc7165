use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicU64, Ordering},
};

/// Observer of client lifecycle and inbound chat traffic.
///
/// Callbacks run on whichever task publishes the event: `on_connected` on the
/// caller of `connect_to_server`, `on_message_received` on the receiver task.
pub trait ClientListener: Send + Sync {
    fn on_connected(&self, username: &str, port: u16, host: &str);

    fn on_message_received(&self, sender: &str, text: &str);
}

/// Handle returned by [`ListenerRegistry::add`], used to unregister later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<(ListenerId, Arc<dyn ClientListener>)>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn ClientListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn publish_connected(&self, username: &str, port: u16, host: &str) {
        for listener in self.snapshot() {
            listener.on_connected(username, port, host);
        }
    }

    pub fn publish_message(&self, sender: &str, text: &str) {
        for listener in self.snapshot() {
            listener.on_message_received(sender, text);
        }
    }

    // Callbacks run without the lock held so they may add or remove listeners.
    fn snapshot(&self) -> Vec<Arc<dyn ClientListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}
