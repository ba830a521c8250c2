// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Real transport implementation using tokio-tungstenite.
//! TLS comes from either the native-tls or the rustls backend feature.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use super::error::NetworkError;
use super::transport::{
    Frame, FramePipe, FrameReceiver, FrameSender, Transport, TransportConfig, TransportResult,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport for the realtime channel.
///
/// Supports both ws:// (plaintext) and wss:// (TLS) connections.
///
/// # Example
///
/// ```ignore
/// use chatline_core::network::{Transport, TransportConfig, WebSocketTransport};
///
/// let transport = WebSocketTransport::new();
/// let config = TransportConfig {
///     server_url: "wss://chat.example.com/ws".to_string(),
///     ..Default::default()
/// };
/// let pipe = transport.open(&config).await?;
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Creates a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport
    }

    /// Checks the URL scheme before attempting a connection.
    fn validate_url(url: &str) -> Result<(), NetworkError> {
        let rest = url
            .strip_prefix("wss://")
            .or_else(|| url.strip_prefix("ws://"))
            .ok_or_else(|| {
                NetworkError::ConnectionFailed(
                    "Invalid URL scheme (expected ws:// or wss://)".into(),
                )
            })?;

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() {
            return Err(NetworkError::ConnectionFailed("Missing host".into()));
        }

        Ok(())
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, config: &TransportConfig) -> TransportResult<FramePipe> {
        Self::validate_url(&config.server_url)?;

        let (socket, response) =
            tokio::time::timeout(config.connect_timeout, connect_async(config.server_url.as_str()))
                .await
                .map_err(|_| NetworkError::Timeout)?
                .map_err(|e| {
                    NetworkError::ConnectionFailed(format!("WebSocket handshake failed: {}", e))
                })?;

        debug!(
            "WebSocket open to {} (HTTP {})",
            config.server_url,
            response.status()
        );

        let (sink, stream) = socket.split();
        Ok(FramePipe {
            sender: Box::new(WebSocketSender { sink }),
            receiver: Box::new(WebSocketReceiver { stream }),
        })
    }
}

struct WebSocketSender {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSender for WebSocketSender {
    async fn send(&mut self, frame: Frame) -> TransportResult<()> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(data) => Message::Binary(data),
            Frame::Ping(data) => Message::Ping(data),
            Frame::Pong(data) => Message::Pong(data),
        };

        self.sink.send(message).await.map_err(|e| match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                NetworkError::ConnectionClosed
            }
            other => NetworkError::SendFailed(other.to_string()),
        })
    }

    async fn close(&mut self) -> TransportResult<()> {
        match self.sink.close().await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(NetworkError::SendFailed(format!("Close failed: {}", e))),
        }
    }
}

struct WebSocketReceiver {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameReceiver for WebSocketReceiver {
    async fn receive(&mut self) -> TransportResult<Frame> {
        loop {
            let frame = match self.stream.next().await {
                Some(Ok(Message::Text(text))) => Frame::Text(text),
                Some(Ok(Message::Binary(data))) => Frame::Binary(data),
                Some(Ok(Message::Ping(data))) => Frame::Ping(data),
                Some(Ok(Message::Pong(data))) => Frame::Pong(data),
                // Raw frames shouldn't reach here
                Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(NetworkError::ConnectionClosed),
                Some(Err(
                    tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
                )) => return Err(NetworkError::ConnectionClosed),
                Some(Err(e)) => return Err(NetworkError::ReceiveFailed(e.to_string())),
            };
            return Ok(frame);
        }
    }
}
