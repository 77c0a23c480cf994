//! Listener registry and fan-out.

use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::types::{DropReason, ListenerConfig, ListenerId, TrackingEvent, UpdateEvent, UpdateListener};

/// Publishes update events to every registered listener.
pub struct Notifier {
    listeners: RwLock<HashMap<ListenerId, Sender<TrackingEvent>>>,
    next_id: AtomicU64,
}

impl Notifier {
    /// Create a notifier with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener.
    pub fn subscribe(&self, config: ListenerConfig) -> UpdateListener {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size.max(1));
        self.listeners.write().insert(id, sender);
        UpdateListener { id, receiver }
    }

    /// Remove a listener.
    pub fn unsubscribe(&self, id: ListenerId) {
        if let Some(sender) = self.listeners.write().remove(&id) {
            let _ = sender.try_send(TrackingEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver `event` to every listener without blocking.
    ///
    /// Listeners that are full or disconnected are removed.
    pub fn publish(&self, event: UpdateEvent) {
        let mut to_remove = Vec::new();

        {
            let listeners = self.listeners.read();
            for (id, sender) in listeners.iter() {
                match sender.try_send(TrackingEvent::Update(event)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                        to_remove.push(*id)
                    }
                }
            }
        }

        if !to_remove.is_empty() {
            let mut listeners = self.listeners.write();
            for id in to_remove {
                if let Some(sender) = listeners.remove(&id) {
                    debug!(listener = id.0, "dropping listener");
                    // Full buffers usually reject this too; the disconnect is the signal.
                    let _ = sender.try_send(TrackingEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
