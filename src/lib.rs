//! # handlink
//!
//! Streaming client for a remote hand-tracking backend.
//!
//! ## Core Concepts
//!
//! - **Categories**: the telemetry a session opts into (landmarks,
//!   orientation, gesture), negotiated once with a handshake
//! - **Ticks**: the host drives receiving, one single-flight receive per frame
//! - **Store**: the latest decoded record per hand, replaced whole each frame
//! - **Notifications**: one update event per received frame
//!
//! ## Example
//!
//! ```ignore
//! use handlink::{Category, HandSide, SessionConfig, SessionController, TrackingEvent};
//! use std::sync::Arc;
//!
//! let session = Arc::new(SessionController::new(SessionConfig::default()));
//! session.set_categories([Category::Landmarks, Category::Gesture])?;
//! session.activate().await?;
//!
//! let listener = session.subscribe();
//!
//! // Once per host frame:
//! session.spawn_tick();
//!
//! if let Ok(TrackingEvent::Update(event)) = listener.try_recv() {
//!     if event.success && event.right_updated {
//!         let index_tip = session.get_landmark(HandSide::Right, "8")?;
//!         let gesture = session.get_gesture(HandSide::Right)?;
//!     }
//! }
//!
//! session.shutdown().await?;
//! ```

pub mod codec;
pub mod connection;
pub mod error;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;

// Re-exports
pub use codec::{decode_payload, encode_handshake, parse_handshake, HANDSHAKE_SENTINEL};
pub use connection::{ConnectionManager, ConnectionState, Transport, WebSocketTransport};
pub use error::{Result, TrackingError};
pub use notify::{
    DropReason, ListenerConfig, ListenerId, Notifier, TrackingEvent, UpdateEvent, UpdateListener,
};
pub use scheduler::{ReceiveScheduler, ReceivedFrame};
pub use session::{
    HandshakeConfirmation, SessionConfig, SessionController, SessionPhase, DEFAULT_URL,
};
pub use store::{HandDataStore, HandFrame};
pub use types::*;
