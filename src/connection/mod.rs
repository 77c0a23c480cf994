//! Transport session to the hand-tracking backend.
//!
//! [`ConnectionManager`] tracks the connection phase and owns a
//! [`Transport`]. The production transport is [`WebSocketTransport`];
//! anything else that moves whole messages can stand in for it.

mod manager;
mod transport;
mod websocket;

pub use manager::{ConnectionManager, ConnectionState};
pub use transport::Transport;
pub use websocket::WebSocketTransport;
