//! WebSocket connections to debugger endpoints.
//!
//! One connection is opened per debug target. Commands go out through the
//! write half held by a [`CommandSink`]; the read half is drained by a
//! spawned task for the lifetime of the socket, so the connection stays open
//! after the last command and replies are only logged.
//!
//! # Reply Loop
//!
//! The spawned task handles:
//!
//! - Command replies (evaluation exceptions are surfaced at `warn`)
//! - Target events (logged at `trace`)
//! - Close frames and socket errors (end the task)

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::from_str;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{Event, Response};

// ============================================================================
// Types
// ============================================================================

/// Client WebSocket stream to a debugger endpoint.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// Traits
// ============================================================================

/// Write side of an open debugger connection.
#[async_trait]
pub trait CommandSink: Send {
    /// Sends one text frame.
    ///
    /// Completes once the frame is written; no reply is awaited.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be written.
    async fn send_text(&mut self, text: String) -> Result<()>;
}

/// Opens connections to debugger endpoints.
#[async_trait]
pub trait SocketConnector: Send + Sync {
    /// Sink type produced by this connector.
    type Sink: CommandSink;

    /// Opens a connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened.
    async fn connect(&self, url: &str) -> Result<Self::Sink>;
}

// ============================================================================
// WsConnector
// ============================================================================

/// [`SocketConnector`] backed by tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Creates a new connector.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SocketConnector for WsConnector {
    type Sink = WsSink;

    async fn connect(&self, url: &str) -> Result<WsSink> {
        let (ws_stream, response) = connect_async(url)
            .await
            .map_err(|e| Error::connection(format!("{url}: {e}")))?;

        debug!(url, status = %response.status(), "Debugger socket open");

        let (write, read) = ws_stream.split();
        tokio::spawn(run_reply_loop(url.to_string(), read));

        Ok(WsSink {
            write,
            url: url.to_string(),
        })
    }
}

// ============================================================================
// WsSink
// ============================================================================

/// Write half of a debugger WebSocket.
pub struct WsSink {
    /// Outgoing frames.
    write: SplitSink<WsStream, Message>,
    /// Endpoint URL, for logging.
    url: String,
}

impl WsSink {
    /// Returns the endpoint URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CommandSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.write.send(Message::Text(text.into())).await?;
        trace!(url = %self.url, "Frame sent");
        Ok(())
    }
}

// ============================================================================
// Reply Loop
// ============================================================================

/// Drains incoming frames until the socket closes.
async fn run_reply_loop(url: String, mut ws_read: SplitStream<WsStream>) {
    loop {
        match ws_read.next().await {
            Some(Ok(Message::Text(text))) => handle_incoming_message(&url, text.as_str()),

            Some(Ok(Message::Close(_))) => {
                debug!(url = %url, "Debugger socket closed by remote");
                break;
            }

            Some(Err(e)) => {
                warn!(url = %url, error = %e, "Debugger socket error");
                break;
            }

            None => {
                debug!(url = %url, "Debugger socket stream ended");
                break;
            }

            // Ignore Binary, Ping, Pong
            _ => {}
        }
    }

    trace!(url = %url, "Reply loop terminated");
}

/// Logs one incoming text frame.
fn handle_incoming_message(url: &str, text: &str) {
    if let Ok(response) = from_str::<Response>(text) {
        if let Some(exception) = response.exception_text() {
            warn!(url, id = response.id, exception = %exception, "Injected script threw");
        } else if let Err(e) = response.into_result() {
            warn!(url, error = %e, "Command rejected");
        } else {
            trace!(url, "Command acknowledged");
        }
        return;
    }

    if let Ok(event) = from_str::<Event>(text) {
        trace!(url, method = %event.method, "Event received");
        return;
    }

    warn!(url, text = %text, "Failed to parse incoming message");
}

// ============================================================================
// Tests
// ============================================================================
