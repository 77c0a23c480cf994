//! Single-flight receive scheduling.
//!
//! The host calls [`ReceiveScheduler::tick`] once per frame. At most one
//! receive is ever in flight; a tick that finds the permit taken returns
//! [`TrackingError::Busy`] at once instead of queueing behind it.

use crate::connection::ConnectionManager;
use crate::error::{Result, TrackingError};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Semaphore;

/// A raw message together with the order it was received in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// Starts at 1 and increases with every completed receive.
    pub sequence: u64,
    pub payload: Vec<u8>,
}

/// Gates receives behind a single permit.
pub struct ReceiveScheduler {
    permit: Semaphore,
    sequence: AtomicU64,
}

impl ReceiveScheduler {
    pub fn new() -> Self {
        Self {
            permit: Semaphore::new(1),
            sequence: AtomicU64::new(0),
        }
    }

    /// Whether a receive is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.permit.available_permits() == 0
    }

    /// Next sequence number, for frames that arrive outside `tick`.
    pub(crate) fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Receive one message and hand it to `on_frame`.
    ///
    /// The permit is released as soon as the receive finishes, before
    /// `on_frame` runs, so the next tick can start receiving while this
    /// frame is still being decoded.
    pub async fn tick<F, R>(&self, connection: &ConnectionManager, on_frame: F) -> Result<R>
    where
        F: FnOnce(ReceivedFrame) -> R,
    {
        let permit = self.permit.try_acquire().map_err(|_| TrackingError::Busy)?;

        let received = connection.try_receive().await;
        let frame = received.map(|payload| ReceivedFrame {
            sequence: self.next_sequence(),
            payload,
        });
        drop(permit);

        Ok(on_frame(frame?))
    }
}

impl Default for ReceiveScheduler {
    fn default() -> Self {
        Self::new()
    }
}
