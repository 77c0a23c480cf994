//! Error types for the hand-tracking client.

use crate::types::{Category, HandSide};
use thiserror::Error;

/// Main error type for client operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection not active")]
    Inactive,

    /// Another receive still holds the permit. Expected under normal backpressure.
    #[error("Receive already in flight")]
    Busy,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Not receiving data of type {category} for {hand} hand")]
    Category { category: Category, hand: HandSide },

    #[error("{0} is not a valid landmark")]
    MissingKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Categories cannot change once activation has begun")]
    CategoriesFrozen,

    #[error("Handshake rejected: expected {expected:?}, got {got:?}")]
    HandshakeRejected { expected: String, got: String },
}

impl TrackingError {
    /// True for the backpressure signal a tick driver should swallow.
    pub fn is_busy(&self) -> bool {
        matches!(self, TrackingError::Busy)
    }
}

impl From<serde_json::Error> for TrackingError {
    fn from(e: serde_json::Error) -> Self {
        TrackingError::Decode(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TrackingError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        TrackingError::Connection(e.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, TrackingError>;
