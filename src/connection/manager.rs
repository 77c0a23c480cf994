//! Connection phase tracking around a transport.

use super::transport::Transport;
use crate::error::{Result, TrackingError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Phase of a connection (and of the session that owns it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Inactive,
    Connecting,
    Active,
    Closed,
}

/// Owns the transport and enforces the connection state machine.
///
/// `Closed` is terminal. Closing aborts any receive in flight.
pub struct ConnectionManager {
    transport: Box<dyn Transport>,
    state: Mutex<ConnectionState>,
    /// Flips to true once on close.
    closed: watch::Sender<bool>,
}

impl ConnectionManager {
    /// Wrap `transport`. Nothing connects until `open`.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            transport,
            state: Mutex::new(ConnectionState::Inactive),
            closed,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Connect. Succeeds immediately if already active.
    pub async fn open(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            match *state {
                ConnectionState::Active => return Ok(()),
                ConnectionState::Connecting => {
                    return Err(TrackingError::Connection("open already in progress".to_string()))
                }
                ConnectionState::Closed => {
                    return Err(TrackingError::Connection("connection is closed".to_string()))
                }
                ConnectionState::Inactive => *state = ConnectionState::Connecting,
            }
        }

        let result = self.transport.connect().await;

        let closed_while_opening = {
            let mut state = self.state.lock();
            match &result {
                Ok(()) if *state == ConnectionState::Connecting => {
                    *state = ConnectionState::Active;
                    info!(endpoint = self.endpoint(), "connection open");
                    return Ok(());
                }
                Ok(()) => true,
                Err(e) => {
                    if *state == ConnectionState::Connecting {
                        *state = ConnectionState::Inactive;
                    }
                    warn!(endpoint = self.endpoint(), error = %e, "connection failed");
                    false
                }
            }
        };

        // The close wins. It ran before the transport was connected, so the
        // transport is released here.
        if closed_while_opening {
            debug!(endpoint = self.endpoint(), "closed while opening, releasing transport");
            if let Err(e) = self.transport.close().await {
                warn!(endpoint = self.endpoint(), error = %e, "releasing transport failed");
            }
            return Err(TrackingError::Connection(
                "connection closed while opening".to_string(),
            ));
        }
        result
    }

    /// Send one whole message.
    pub async fn send(&self, message: &[u8]) -> Result<()> {
        self.ensure_active()?;
        self.transport.send(message).await
    }

    /// Wait for the next message.
    ///
    /// A transport failure here is fatal and moves the connection to
    /// `Closed`. Returns early with an error if the connection is closed
    /// while waiting.
    pub async fn try_receive(&self) -> Result<Vec<u8>> {
        self.ensure_active()?;
        let mut closed = self.closed.subscribe();

        tokio::select! {
            biased;
            _ = async { closed.wait_for(|closed| *closed).await.map(|_| ()) } => {
                Err(TrackingError::Connection("connection closed while receiving".to_string()))
            }
            received = self.transport.receive() => {
                if let Err(e) = &received {
                    let mut state = self.state.lock();
                    if *state == ConnectionState::Active {
                        *state = ConnectionState::Closed;
                        warn!(endpoint = self.endpoint(), error = %e, "receive failed, connection closed");
                    }
                }
                received
            }
        }
    }

    /// Close the connection and abort any receive in flight.
    ///
    /// Closing while `open` is still connecting marks the connection closed
    /// and leaves releasing the transport to `open`.
    pub async fn close(&self) -> Result<()> {
        let previous = {
            let mut state = self.state.lock();
            match *state {
                ConnectionState::Inactive | ConnectionState::Closed => {
                    return Err(TrackingError::Inactive)
                }
                ConnectionState::Connecting | ConnectionState::Active => {
                    std::mem::replace(&mut *state, ConnectionState::Closed)
                }
            }
        };
        self.closed.send_replace(true);

        if previous == ConnectionState::Connecting {
            debug!(endpoint = self.endpoint(), "closed while connecting");
            return Ok(());
        }
        debug!(endpoint = self.endpoint(), "closing connection");
        self.transport.close().await
    }

    fn ensure_active(&self) -> Result<()> {
        if self.state() != ConnectionState::Active {
            return Err(TrackingError::Inactive);
        }
        Ok(())
    }
}
