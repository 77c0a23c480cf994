//! Message transport seam.

use crate::error::Result;
use async_trait::async_trait;

/// Moves whole messages to and from the backend.
///
/// Implementations must allow `receive` to be pending on one task while
/// `send` or `close` run on another.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the session.
    async fn connect(&self) -> Result<()>;

    /// Send one complete message.
    async fn send(&self, message: &[u8]) -> Result<()>;

    /// Wait for the next complete message.
    async fn receive(&self) -> Result<Vec<u8>>;

    /// Orderly shutdown of the session.
    async fn close(&self) -> Result<()>;

    /// Where this transport points, for logs.
    fn endpoint(&self) -> &str;
}
