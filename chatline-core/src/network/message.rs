// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Message Types
//!
//! Wire protocol envelopes for the realtime channel. Every frame is a JSON
//! object `{"type": ..., "payload": {...}}`; the `type` discriminator selects
//! exactly one payload shape.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned durable message identifier.
pub type MessageId = String;

/// Locally generated identifier of an optimistic send.
pub type ClientId = String;

/// Account identifier.
pub type UserId = String;

/// Messages sent from the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientEnvelope {
    /// Authentication; always the first frame on a new transport.
    #[serde(rename = "AUTH")]
    Auth(AuthPayload),
    /// Outgoing chat message.
    #[serde(rename = "CHAT_MESSAGE")]
    Chat(ChatPayload),
    /// Notice that a peer message has been displayed.
    #[serde(rename = "MESSAGE_SEEN")]
    MessageSeen(MessageSeenPayload),
    /// Typing indicator.
    #[serde(rename = "USER_TYPING")]
    Typing(TypingPayload),
    /// Add or replace our reaction on a message.
    #[serde(rename = "ADD_REACTION")]
    AddReaction(AddReactionPayload),
    /// Remove our reaction from a message.
    #[serde(rename = "REMOVE_REACTION")]
    RemoveReaction(RemoveReactionPayload),
}

/// Messages sent from the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEnvelope {
    /// Credentials accepted.
    #[serde(rename = "AUTH_OK")]
    AuthOk(AuthOkPayload),
    /// Credentials rejected.
    #[serde(rename = "AUTH_ERROR")]
    AuthError(AuthErrorPayload),
    /// A chat message from a peer.
    #[serde(rename = "CHAT_MESSAGE")]
    Chat(ChatMessagePayload),
    /// The server stored one of our messages.
    #[serde(rename = "MESSAGE_DELIVERED")]
    MessageDelivered(MessageDeliveredPayload),
    /// The peer saw one of our messages.
    #[serde(rename = "MESSAGE_SEEN")]
    MessageSeen(MessageSeenPayload),
    /// A reaction was added or replaced.
    #[serde(rename = "ADD_REACTION")]
    AddReaction(ReactionAddedPayload),
    /// A reaction was removed.
    #[serde(rename = "REMOVE_REACTION")]
    RemoveReaction(ReactionRemovedPayload),
    /// Peer typing indicator.
    #[serde(rename = "USER_TYPING")]
    UserTyping(UserTypingPayload),
    /// A user came online.
    #[serde(rename = "USER_ONLINE")]
    UserOnline(UserOnlinePayload),
    /// A user went offline.
    #[serde(rename = "USER_OFFLINE")]
    UserOffline(UserOfflinePayload),
    /// Application-level error notice. Informational only.
    #[serde(rename = "ERROR")]
    Error(ServerErrorPayload),
}

// ============================================================
// Client payloads
// ============================================================

/// Authentication payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user_id: UserId,
    pub token: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Outgoing chat message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub to_user_id: UserId,
    pub text: String,
    pub client_id: ClientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replying_to: Option<MessageId>,
}

/// Seen notice; identical shape in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSeenPayload {
    pub message_id: MessageId,
}

/// Typing indicator payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub to_user_id: UserId,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReactionPayload {
    pub message_id: MessageId,
    pub to_user_id: UserId,
    pub reaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveReactionPayload {
    pub message_id: MessageId,
    pub to_user_id: UserId,
}

// ============================================================
// Server payloads
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOkPayload {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthErrorPayload {
    pub error: String,
}

/// Inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub from_user_id: UserId,
    pub text: String,
    pub message_id: MessageId,
    /// Epoch milliseconds.
    #[serde(with = "epoch_millis")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replying_to: Option<MessageId>,
    /// Echoed client id, present when the server relays our own send back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
}

/// Delivery receipt correlating an optimistic send with its durable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDeliveredPayload {
    pub message_id: MessageId,
    pub client_id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionAddedPayload {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub reaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRemovedPayload {
    pub message_id: MessageId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingPayload {
    pub from_user_id: UserId,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOnlinePayload {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOfflinePayload {
    pub user_id: UserId,
    /// Epoch milliseconds.
    #[serde(with = "epoch_millis")]
    pub last_seen: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorPayload {
    pub error: String,
}

// ============================================================
// Constructors
// ============================================================

impl ClientEnvelope {
    /// Creates the authentication envelope.
    pub fn auth(user_id: &str, token: &str) -> Self {
        ClientEnvelope::Auth(AuthPayload {
            user_id: user_id.to_string(),
            token: token.to_string(),
        })
    }

    /// Creates a chat envelope.
    pub fn chat(
        to_user_id: &str,
        text: &str,
        client_id: &str,
        replying_to: Option<&str>,
    ) -> Self {
        ClientEnvelope::Chat(ChatPayload {
            to_user_id: to_user_id.to_string(),
            text: text.to_string(),
            client_id: client_id.to_string(),
            replying_to: replying_to.map(str::to_string),
        })
    }

    /// Creates a seen notice for a peer message.
    pub fn seen(message_id: &str) -> Self {
        ClientEnvelope::MessageSeen(MessageSeenPayload {
            message_id: message_id.to_string(),
        })
    }

    /// Creates a typing indicator.
    pub fn typing(to_user_id: &str, is_typing: bool) -> Self {
        ClientEnvelope::Typing(TypingPayload {
            to_user_id: to_user_id.to_string(),
            is_typing,
        })
    }

    pub fn add_reaction(message_id: &str, to_user_id: &str, reaction: &str) -> Self {
        ClientEnvelope::AddReaction(AddReactionPayload {
            message_id: message_id.to_string(),
            to_user_id: to_user_id.to_string(),
            reaction: reaction.to_string(),
        })
    }

    pub fn remove_reaction(message_id: &str, to_user_id: &str) -> Self {
        ClientEnvelope::RemoveReaction(RemoveReactionPayload {
            message_id: message_id.to_string(),
            to_user_id: to_user_id.to_string(),
        })
    }

    /// Returns the wire `type` discriminator.
    pub fn message_type(&self) -> &'static str {
        match self {
            ClientEnvelope::Auth(_) => "AUTH",
            ClientEnvelope::Chat(_) => "CHAT_MESSAGE",
            ClientEnvelope::MessageSeen(_) => "MESSAGE_SEEN",
            ClientEnvelope::Typing(_) => "USER_TYPING",
            ClientEnvelope::AddReaction(_) => "ADD_REACTION",
            ClientEnvelope::RemoveReaction(_) => "REMOVE_REACTION",
        }
    }
}

impl ServerEnvelope {
    /// Returns the wire `type` discriminator.
    pub fn message_type(&self) -> &'static str {
        match self {
            ServerEnvelope::AuthOk(_) => "AUTH_OK",
            ServerEnvelope::AuthError(_) => "AUTH_ERROR",
            ServerEnvelope::Chat(_) => "CHAT_MESSAGE",
            ServerEnvelope::MessageDelivered(_) => "MESSAGE_DELIVERED",
            ServerEnvelope::MessageSeen(_) => "MESSAGE_SEEN",
            ServerEnvelope::AddReaction(_) => "ADD_REACTION",
            ServerEnvelope::RemoveReaction(_) => "REMOVE_REACTION",
            ServerEnvelope::UserTyping(_) => "USER_TYPING",
            ServerEnvelope::UserOnline(_) => "USER_ONLINE",
            ServerEnvelope::UserOffline(_) => "USER_OFFLINE",
            ServerEnvelope::Error(_) => "ERROR",
        }
    }
}

/// Serde helper for epoch-millisecond timestamps.
///
/// Servers emit either integers or doubles; both are accepted and rounded.
pub(crate) mod epoch_millis {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Integer(i64),
        Float(f64),
    }

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Number::deserialize(deserializer)? {
            Number::Integer(value) => Ok(value),
            Number::Float(value) if value.is_finite() => Ok(value.round() as i64),
            Number::Float(_) => Err(serde::de::Error::custom("timestamp is not finite")),
        }
    }
}
