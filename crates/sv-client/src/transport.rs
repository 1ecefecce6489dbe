//! WebSocket transport to the game process
//!
//! Owns the single duplex channel. Sends are fire-and-forget: a frame is
//! written only while connected and is never queued for later delivery;
//! callers rely on the correlator's per-command timeout instead of any
//! transport-level buffering.

use std::fmt;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use sv_protocol::Outbound;

use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection status of a transport (and of the session owning it)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No channel to the game
    Disconnected,
    /// A connect attempt is in progress
    Connecting,
    /// The channel is open
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// The single WebSocket connection to the game
pub struct Transport {
    ws: WsStream,
    status: ConnectionStatus,
}

impl Transport {
    /// Open the duplex channel, resolving once the WebSocket handshake
    /// completes.
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        tracing::debug!(%endpoint, "Connecting to game");

        let (ws, _) = tokio::time::timeout(timeout, connect_async(endpoint))
            .await
            .map_err(|_| ClientError::Connection(format!("Connect to {endpoint} timed out")))?
            .map_err(|e| ClientError::Connection(format!("Connect to {endpoint}: {e}")))?;

        tracing::debug!(%endpoint, "WebSocket open");
        Ok(Self {
            ws,
            status: ConnectionStatus::Connected,
        })
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Write one frame if connected; silently drop it otherwise.
    ///
    /// A write failure marks the transport disconnected and is returned so
    /// the session can run its connection-loss path.
    pub async fn send(&mut self, frame: &Outbound) -> Result<(), ClientError> {
        if self.status != ConnectionStatus::Connected {
            tracing::debug!("Dropping outbound frame while disconnected");
            return Ok(());
        }

        let text = sv_protocol::encode(frame)?;
        if let Err(e) = self.ws.send(Message::Text(text.into())).await {
            self.status = ConnectionStatus::Disconnected;
            return Err(ClientError::ConnectionLost(e.to_string()));
        }
        Ok(())
    }

    /// Receive the next inbound text payload, in receipt order.
    ///
    /// Returns `None` once the channel has closed or errored; the status is
    /// `Disconnected` from then on. Non-text WebSocket messages are skipped.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | None => {
                    self.status = ConnectionStatus::Disconnected;
                    return None;
                }
                Some(Ok(_)) => continue, // binary / ping / pong
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "WebSocket receive error");
                    self.status = ConnectionStatus::Disconnected;
                    return None;
                }
            }
        }
    }

    /// Initiate a graceful shutdown
    pub async fn close(&mut self) {
        if self.status == ConnectionStatus::Connected {
            let _ = self.ws.close(None).await;
        }
        self.status = ConnectionStatus::Disconnected;
    }
}
