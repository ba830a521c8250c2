// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Protocol Codec
//!
//! JSON encoding of envelopes. Decoding reads the `type` discriminator first
//! and then the payload strictly for that variant; anything that does not fit
//! is rejected with [`NetworkError::InvalidMessage`] and leaves no state behind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::NetworkError;
use super::message::{ClientEnvelope, ServerEnvelope};

/// Maximum accepted frame size (1 MiB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Only the discriminator, used to reject frames before the payload is parsed.
#[derive(Deserialize)]
struct EnvelopeHeader {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Encodes an outbound envelope to a JSON text frame.
pub fn encode_message(envelope: &ClientEnvelope) -> Result<String, NetworkError> {
    encode(envelope)
}

/// Decodes an inbound frame into a server envelope.
pub fn decode_message(data: &[u8]) -> Result<ServerEnvelope, NetworkError> {
    decode(data)
}

/// Decodes an inbound text frame into a server envelope.
pub fn decode_text(text: &str) -> Result<ServerEnvelope, NetworkError> {
    decode(text.as_bytes())
}

/// Encodes a server envelope. Used by mock peers and tests.
pub fn encode_server_message(envelope: &ServerEnvelope) -> Result<String, NetworkError> {
    encode(envelope)
}

/// Decodes a client envelope. Used by mock peers and tests.
pub fn decode_client_message(data: &[u8]) -> Result<ClientEnvelope, NetworkError> {
    decode(data)
}

fn encode<T: Serialize>(envelope: &T) -> Result<String, NetworkError> {
    serde_json::to_string(envelope).map_err(|e| NetworkError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, NetworkError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(NetworkError::InvalidMessage(format!(
            "Frame too large: {} bytes",
            data.len()
        )));
    }

    let header: EnvelopeHeader = serde_json::from_slice(data)
        .map_err(|e| NetworkError::InvalidMessage(format!("Malformed envelope: {}", e)))?;
    let kind = header
        .kind
        .ok_or_else(|| NetworkError::InvalidMessage("Missing type".into()))?;

    serde_json::from_slice(data)
        .map_err(|e| NetworkError::InvalidMessage(format!("Bad {} envelope: {}", kind, e)))
}
