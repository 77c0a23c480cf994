//! WebSocket transport.

use super::transport::Transport;
use crate::error::{Result, TrackingError};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client side of a websocket session.
///
/// Reader and writer halves are locked separately so a pending receive
/// does not hold up a send or close.
pub struct WebSocketTransport {
    url: String,
    writer: Mutex<Option<SplitSink<WsStream, Message>>>,
    reader: Mutex<Option<SplitStream<WsStream>>>,
}

impl WebSocketTransport {
    /// `url` may omit the scheme, in which case `ws://` is assumed.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let url = if url.starts_with("ws://") || url.starts_with("wss://") {
            url
        } else {
            format!("ws://{}", url)
        };

        Self {
            url,
            writer: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self) -> Result<()> {
        let (stream, response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| TrackingError::Connection(format!("connect to {}: {}", self.url, e)))?;
        debug!(url = %self.url, status = %response.status(), "websocket connected");

        let (writer, reader) = stream.split();
        *self.writer.lock().await = Some(writer);
        *self.reader.lock().await = Some(reader);
        Ok(())
    }

    async fn send(&self, message: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let writer = writer
            .as_mut()
            .ok_or_else(|| TrackingError::Connection("websocket not connected".to_string()))?;

        // The backend reads the handshake as text.
        let message = match std::str::from_utf8(message) {
            Ok(text) => Message::Text(text.to_owned()),
            Err(_) => Message::Binary(message.to_vec()),
        };
        writer.send(message).await?;
        Ok(())
    }

    async fn receive(&self) -> Result<Vec<u8>> {
        let mut reader = self.reader.lock().await;
        let reader = reader
            .as_mut()
            .ok_or_else(|| TrackingError::Connection("websocket not connected".to_string()))?;

        loop {
            match reader.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.into_bytes()),
                Some(Ok(Message::Binary(data))) => return Ok(data),
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|f| f.reason.into_owned()).unwrap_or_default();
                    return Err(TrackingError::Connection(format!(
                        "closed by backend: {:?}",
                        reason
                    )));
                }
                Some(Ok(other)) => trace!(?other, "skipping control frame"),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(TrackingError::Connection("stream ended".to_string())),
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let Some(mut writer) = self.writer.lock().await.take() else {
            return Err(TrackingError::Connection("websocket not connected".to_string()));
        };

        writer
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "Client closed".into(),
            })))
            .await?;
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
