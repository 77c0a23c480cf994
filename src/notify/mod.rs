//! Update notifications for consumers of decoded hand data.
//!
//! Every decode attempt publishes exactly one [`UpdateEvent`] to every
//! registered listener, after the data store has been updated, so a
//! listener that reads the store on notification always sees the frame
//! the event describes (or a newer one).
//!
//! Listeners have bounded buffers. A listener that falls behind is dropped
//! and sent a best-effort [`TrackingEvent::Dropped`].
//!
//! # Example
//!
//! ```ignore
//! let listener = session.subscribe(ListenerConfig::default());
//!
//! loop {
//!     match listener.recv() {
//!         Ok(TrackingEvent::Update(event)) if event.success => {
//!             if event.right_updated {
//!                 let wrist = session.get_landmark(HandSide::Right, "0")?;
//!             }
//!         }
//!         Ok(TrackingEvent::Update(_)) => continue,
//!         Ok(TrackingEvent::Dropped { .. }) | Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::Notifier;
pub use types::{DropReason, ListenerConfig, ListenerId, TrackingEvent, UpdateEvent, UpdateListener};
