//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use handlink::{Result, TrackingError, TrackingEvent, UpdateListener, LANDMARK_COUNT};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// In-memory transport. Clones share state, so a test keeps one clone to
/// feed frames and inspect what the session sent.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockState>,
}

struct MockState {
    inbound_tx: mpsc::UnboundedSender<Result<Vec<u8>>>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<Vec<u8>>>>,
    sent: Mutex<Vec<Vec<u8>>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    fail_connect: AtomicBool,
    fail_send: AtomicBool,
    gate_connect: AtomicBool,
    connect_gate: Notify,
}

impl MockTransport {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(MockState {
                inbound_tx,
                inbound_rx: tokio::sync::Mutex::new(inbound_rx),
                sent: Mutex::new(Vec::new()),
                connects: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                fail_connect: AtomicBool::new(false),
                fail_send: AtomicBool::new(false),
                gate_connect: AtomicBool::new(false),
                connect_gate: Notify::new(),
            }),
        }
    }

    /// Queue a frame for the session to receive.
    pub fn push(&self, frame: impl Into<Vec<u8>>) {
        let _ = self.inner.inbound_tx.send(Ok(frame.into()));
    }

    pub fn push_json(&self, frame: &Value) {
        self.push(frame.to_string())
    }

    /// Queue a transport failure.
    pub fn push_error(&self, message: &str) {
        let _ = self
            .inner
            .inbound_tx
            .send(Err(TrackingError::Connection(message.to_string())));
    }

    pub fn fail_connect(&self, fail: bool) {
        self.inner.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_send(&self, fail: bool) {
        self.inner.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Hold every connect until `release_connect`.
    pub fn gate_connect(&self) {
        self.inner.gate_connect.store(true, Ordering::SeqCst);
    }

    pub fn release_connect(&self) {
        self.inner.connect_gate.notify_one();
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.inner.sent.lock().clone()
    }

    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl handlink::Transport for MockTransport {
    async fn connect(&self) -> Result<()> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        if self.inner.gate_connect.load(Ordering::SeqCst) {
            self.inner.connect_gate.notified().await;
        }
        if self.inner.fail_connect.load(Ordering::SeqCst) {
            return Err(TrackingError::Connection("connection refused".to_string()));
        }
        Ok(())
    }

    async fn send(&self, message: &[u8]) -> Result<()> {
        if self.inner.fail_send.load(Ordering::SeqCst) {
            return Err(TrackingError::Connection("broken pipe".to_string()));
        }
        self.inner.sent.lock().push(message.to_vec());
        Ok(())
    }

    async fn receive(&self) -> Result<Vec<u8>> {
        match self.inner.inbound_rx.lock().await.recv().await {
            Some(frame) => frame,
            None => Err(TrackingError::Connection("stream ended".to_string())),
        }
    }

    async fn close(&self) -> Result<()> {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "mock://hands"
    }
}

/// A full 21-point landmark map. Point `i` is `(i + offset, i / 10, -i)`.
pub fn full_landmarks(offset: f32) -> Value {
    let points: serde_json::Map<String, Value> = (0..LANDMARK_COUNT)
        .map(|i| {
            let i = i as f32;
            (
                (i as usize).to_string(),
                json!({"x": i + offset, "y": i / 10.0, "z": -i}),
            )
        })
        .collect();
    Value::Object(points)
}

/// Wait for the next event without blocking the runtime.
pub async fn next_event(listener: &UpdateListener) -> TrackingEvent {
    for _ in 0..200 {
        if let Ok(event) = listener.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("no event within 1s");
}
