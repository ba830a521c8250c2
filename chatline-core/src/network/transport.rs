// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Platform-agnostic abstraction for the realtime channel.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to any server.
    Disconnected,
    /// Transport opening or waiting for the auth reply.
    Connecting,
    /// Authenticated and ready.
    Connected,
    /// The server rejected our credentials. Terminal.
    AuthFailed(String),
}

/// A single frame on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
}

/// Configuration for opening a transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Server URL (ws:// or wss://).
    pub server_url: String,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            server_url: String::new(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Write half of an open transport.
#[async_trait]
pub trait FrameSender: Send {
    /// Writes one frame.
    async fn send(&mut self, frame: Frame) -> TransportResult<()>;

    /// Closes the transport. Safe to call more than once.
    async fn close(&mut self) -> TransportResult<()>;
}

/// Read half of an open transport.
#[async_trait]
pub trait FrameReceiver: Send {
    /// Waits for the next frame.
    ///
    /// Returns [`NetworkError::ConnectionClosed`] once the remote side is gone.
    async fn receive(&mut self) -> TransportResult<Frame>;
}

/// An open transport, split into halves so reads and writes proceed independently.
pub struct FramePipe {
    pub sender: Box<dyn FrameSender>,
    pub receiver: Box<dyn FrameReceiver>,
}

impl fmt::Debug for FramePipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePipe").finish_non_exhaustive()
    }
}

/// Transport trait for the realtime channel.
///
/// Abstracts the underlying mechanism (WebSocket in production, in-memory
/// channels in tests). Each call to [`Transport::open`] yields a fresh pipe;
/// the connection owns at most one pipe at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a new connection to the server.
    async fn open(&self, config: &TransportConfig) -> TransportResult<FramePipe>;
}
