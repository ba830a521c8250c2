// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Error Types

use thiserror::Error;

/// Errors raised by the realtime transport layer.
///
/// Cloneable so the same error can be delivered to every event handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The transport could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The remote side closed the connection.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Opening the connection took too long.
    #[error("Connection timeout")]
    Timeout,

    /// Writing a frame failed.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Reading a frame failed.
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// The liveness probe was not answered in time.
    #[error("Heartbeat timeout")]
    HeartbeatTimeout,

    /// The server rejected our credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An inbound frame could not be decoded.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// An outbound envelope could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NetworkError {
    /// Returns true for failures that the reconnect policy may recover from.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            NetworkError::AuthenticationFailed(_)
                | NetworkError::InvalidMessage(_)
                | NetworkError::Serialization(_)
        )
    }
}
