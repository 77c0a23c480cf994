//! Session controller: subscription, activation and the decode step.

use crate::codec::{decode_payload, encode_handshake};
use crate::connection::{ConnectionManager, ConnectionState, Transport, WebSocketTransport};
use crate::error::{Result, TrackingError};
use crate::notify::{ListenerConfig, ListenerId, Notifier, UpdateEvent, UpdateListener};
use crate::scheduler::{ReceiveScheduler, ReceivedFrame};
use crate::store::{HandDataStore, HandFrame};
use crate::types::{Category, CategorySet, Gesture, HandRecord, HandSide, Orientation, Vector3};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Session phases share the connection's state machine.
pub type SessionPhase = ConnectionState;

/// Backend address used when none is configured.
pub const DEFAULT_URL: &str = "ws://localhost:8765";

/// What to do with the backend's reply to the handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeConfirmation {
    /// Do not wait for a reply.
    #[default]
    Disabled,
    /// Read the reply and log whether it echoes the handshake.
    LogOnly,
    /// Read the reply and fail activation unless it echoes the handshake.
    Required,
}

/// Session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Backend websocket address.
    pub url: String,

    /// Handshake echo handling.
    pub handshake_confirmation: HandshakeConfirmation,

    /// Buffer size for listeners registered with `subscribe`.
    /// Default: 256
    pub listener_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            handshake_confirmation: HandshakeConfirmation::Disabled,
            listener_buffer: ListenerConfig::default().buffer_size,
        }
    }
}

/// Drives one connection to the backend and owns everything decoded from it.
///
/// Typical use:
/// 1. `set_categories` with the telemetry wanted
/// 2. `activate` to connect and send the handshake
/// 3. `tick` (or `spawn_tick`) once per host frame
/// 4. read through `get_landmark`/`get_gesture`/`get_orientation`
/// 5. `shutdown`
pub struct SessionController {
    config: SessionConfig,
    phase: RwLock<SessionPhase>,
    categories: RwLock<CategorySet>,
    connection: ConnectionManager,
    scheduler: ReceiveScheduler,
    store: HandDataStore,
    notifier: Notifier,
    /// Most recent raw frame, for diagnostics only.
    last_payload: Mutex<Option<Vec<u8>>>,
}

impl SessionController {
    /// Session over a websocket to `config.url`.
    pub fn new(config: SessionConfig) -> Self {
        let transport = WebSocketTransport::new(config.url.clone());
        Self::with_transport(config, transport)
    }

    /// Session over any transport.
    pub fn with_transport(config: SessionConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            phase: RwLock::new(SessionPhase::Inactive),
            categories: RwLock::new(CategorySet::empty()),
            connection: ConnectionManager::new(Box::new(transport)),
            scheduler: ReceiveScheduler::new(),
            store: HandDataStore::new(),
            notifier: Notifier::new(),
            last_payload: Mutex::new(None),
        }
    }

    /// Configuration this session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// Add categories to the subscription.
    ///
    /// Only allowed while the session is inactive; once activation begins
    /// the set is frozen and this returns `CategoriesFrozen`.
    pub fn set_categories<I>(&self, categories: I) -> Result<()>
    where
        I: IntoIterator<Item = Category>,
    {
        let phase = self.phase.read();
        if *phase != SessionPhase::Inactive {
            return Err(TrackingError::CategoriesFrozen);
        }

        let mut current = self.categories.write();
        *current = current.union(categories.into_iter().collect());
        debug!(categories = ?*current, "subscription updated");
        Ok(())
    }

    /// Connect and send the handshake.
    ///
    /// Failures leave the session inactive and are not retried, unless the
    /// connection itself was lost, in which case the session is closed.
    pub async fn activate(&self) -> Result<()> {
        let categories = {
            let mut phase = self.phase.write();
            match *phase {
                SessionPhase::Active => return Ok(()),
                SessionPhase::Connecting => {
                    return Err(TrackingError::Connection(
                        "activation already in progress".to_string(),
                    ))
                }
                SessionPhase::Closed => return Err(TrackingError::Inactive),
                SessionPhase::Inactive => {}
            }

            let categories = *self.categories.read();
            if categories.is_empty() {
                error!("activation requested with no categories subscribed");
                return Err(TrackingError::Config(
                    "no categories subscribed, cannot activate".to_string(),
                ));
            }
            *phase = SessionPhase::Connecting;
            categories
        };

        let result = self.open_and_handshake(categories).await;

        let mut phase = self.phase.write();
        match result {
            Ok(()) if *phase == SessionPhase::Connecting => {
                *phase = SessionPhase::Active;
                info!(endpoint = self.connection.endpoint(), ?categories, "session active");
                Ok(())
            }
            Ok(()) => {
                warn!("session shut down during activation");
                Err(TrackingError::Inactive)
            }
            Err(e) => {
                if *phase == SessionPhase::Connecting {
                    *phase = if self.connection.state() == ConnectionState::Closed {
                        SessionPhase::Closed
                    } else {
                        SessionPhase::Inactive
                    };
                }
                error!(endpoint = self.connection.endpoint(), error = %e, "activation failed");
                Err(e)
            }
        }
    }

    async fn open_and_handshake(&self, categories: CategorySet) -> Result<()> {
        self.connection.open().await?;

        let handshake = encode_handshake(categories);
        self.connection.send(&handshake).await?;
        debug!(handshake = %String::from_utf8_lossy(&handshake), "handshake sent");

        let mode = self.config.handshake_confirmation;
        if mode == HandshakeConfirmation::Disabled {
            return Ok(());
        }

        let echo = self.connection.try_receive().await?;
        if echo == handshake {
            info!("handshake confirmed");
            return Ok(());
        }

        let expected = String::from_utf8_lossy(&handshake).into_owned();
        let got = String::from_utf8_lossy(&echo).into_owned();
        match mode {
            HandshakeConfirmation::Required => {
                Err(TrackingError::HandshakeRejected { expected, got })
            }
            _ => {
                warn!(%expected, %got, "handshake reply does not echo the request");
                Ok(())
            }
        }
    }

    /// Close the connection.
    ///
    /// Safe to call at any point; a receive in flight is aborted rather
    /// than waited for.
    pub async fn shutdown(&self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.phase.write(), SessionPhase::Closed);

        let result = self.connection.close().await;
        match &result {
            Ok(()) => info!(?previous, "session closed"),
            Err(e) => warn!(?previous, error = %e, "closing connection failed"),
        }
        result
    }

    // --- Receiving ---

    /// Attempt one receive. Called by the host once per frame.
    ///
    /// Returns `Busy` if the previous receive is still waiting.
    pub async fn tick(&self) -> Result<UpdateEvent> {
        if self.phase() != SessionPhase::Active {
            return Err(TrackingError::Inactive);
        }

        let result = self
            .scheduler
            .tick(&self.connection, |frame| self.decode_and_publish(frame))
            .await;

        if result.is_err() && self.connection.state() == ConnectionState::Closed {
            let mut phase = self.phase.write();
            if *phase == SessionPhase::Active {
                *phase = SessionPhase::Closed;
                warn!("connection lost, session closed");
            }
        }
        result
    }

    /// Run one `tick` in the background, swallowing `Busy`.
    pub fn spawn_tick(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            match session.tick().await {
                Ok(_) => {}
                Err(e) if e.is_busy() => {}
                Err(TrackingError::Inactive) => trace!("tick skipped, session not active"),
                Err(e) => debug!(error = %e, "tick failed"),
            }
        })
    }

    /// Decode a raw frame, update the store and notify listeners.
    ///
    /// Publishes exactly one event whether or not the frame decodes.
    pub fn on_raw_payload(&self, payload: &[u8]) -> UpdateEvent {
        self.decode_and_publish(ReceivedFrame {
            sequence: self.scheduler.next_sequence(),
            payload: payload.to_vec(),
        })
    }

    fn decode_and_publish(&self, frame: ReceivedFrame) -> UpdateEvent {
        let ReceivedFrame { sequence, payload } = frame;
        let decoded = decode_payload(&payload);
        *self.last_payload.lock() = Some(payload);

        let event = match decoded {
            Ok((right, left)) => {
                let subscribed = self.categories();
                let right_updated = right.has_any(subscribed);
                let left_updated = left.has_any(subscribed);

                if self.store.replace(HandFrame {
                    sequence,
                    right,
                    left,
                }) {
                    UpdateEvent {
                        success: true,
                        right_updated,
                        left_updated,
                        sequence,
                    }
                } else {
                    debug!(sequence, "newer frame already stored, discarding");
                    UpdateEvent {
                        success: true,
                        right_updated: false,
                        left_updated: false,
                        sequence,
                    }
                }
            }
            Err(e) => {
                warn!(sequence, error = %e, "discarding undecodable frame");
                UpdateEvent::failed(sequence)
            }
        };

        self.notifier.publish(event);
        event
    }

    // --- Notifications ---

    /// Register an update listener with the configured buffer size.
    pub fn subscribe(&self) -> UpdateListener {
        self.subscribe_with(ListenerConfig {
            buffer_size: self.config.listener_buffer,
        })
    }

    /// Register an update listener with its own buffer size.
    pub fn subscribe_with(&self, config: ListenerConfig) -> UpdateListener {
        self.notifier.subscribe(config)
    }

    /// Remove a listener. It receives a final `Dropped` event.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.notifier.unsubscribe(id)
    }

    // --- Accessors ---

    /// Landmark `key` of `hand` from the current frame.
    pub fn get_landmark(&self, hand: HandSide, key: &str) -> Result<Vector3> {
        self.store.landmark(self.categories(), hand, key)
    }

    /// Landmark by numeric index (0-20).
    pub fn get_landmark_at(&self, hand: HandSide, index: usize) -> Result<Vector3> {
        self.get_landmark(hand, &index.to_string())
    }

    /// Recognized gesture of `hand` from the current frame.
    pub fn get_gesture(&self, hand: HandSide) -> Result<Gesture> {
        self.store.gesture(self.categories(), hand)
    }

    /// Orientation of `hand` from the current frame.
    pub fn get_orientation(&self, hand: HandSide) -> Result<Orientation> {
        self.store.orientation(self.categories(), hand)
    }

    /// Whole record for one hand from the current frame.
    pub fn snapshot(&self, hand: HandSide) -> HandRecord {
        self.store.snapshot(hand)
    }

    /// Both hands from the current frame.
    pub fn frame(&self) -> Arc<HandFrame> {
        self.store.frame()
    }

    // --- Diagnostics ---

    /// Current session phase.
    pub fn phase(&self) -> SessionPhase {
        *self.phase.read()
    }

    /// Subscribed categories.
    pub fn categories(&self) -> CategorySet {
        *self.categories.read()
    }

    /// State of the underlying connection.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Backend address.
    pub fn endpoint(&self) -> &str {
        self.connection.endpoint()
    }

    /// Raw bytes of the most recent frame, decoded or not.
    pub fn last_payload(&self) -> Option<Vec<u8>> {
        self.last_payload.lock().clone()
    }
}
