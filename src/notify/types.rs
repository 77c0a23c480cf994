//! Notification types.

use serde::{Deserialize, Serialize};

/// Configuration for a listener.
#[derive(Clone, Debug)]
pub struct ListenerConfig {
    /// Max buffered events before the listener is dropped.
    /// Default: 256
    pub buffer_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { buffer_size: 256 }
    }
}

/// Summary of one decode attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// False if the payload could not be decoded. The store is unchanged.
    pub success: bool,
    /// A subscribed category now holds a value for the right hand.
    pub right_updated: bool,
    /// A subscribed category now holds a value for the left hand.
    pub left_updated: bool,
    /// Frame sequence this event describes.
    pub sequence: u64,
}

impl UpdateEvent {
    pub fn failed(sequence: u64) -> Self {
        Self {
            success: false,
            right_updated: false,
            left_updated: false,
            sequence,
        }
    }
}

/// Events delivered to listeners.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingEvent {
    /// A frame was received and a decode was attempted.
    Update(UpdateEvent),

    /// The listener was removed.
    Dropped { reason: DropReason },
}

/// Why a listener was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Receiving end of a listener registration.
pub struct UpdateListener {
    pub id: ListenerId,
    pub receiver: crossbeam_channel::Receiver<TrackingEvent>,
}

impl UpdateListener {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<TrackingEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<TrackingEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<TrackingEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
