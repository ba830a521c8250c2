// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! REST Payloads
//!
//! Request and response bodies of the login, conversation list and history
//! endpoints. Field names are camelCase on the wire.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::network::{epoch_millis, MessageId, UserId};

/// `POST /login` body.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: UserId,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /login` response.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// One entry of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub peer_id: UserId,
    pub last_message: String,
    /// Epoch milliseconds.
    #[serde(with = "epoch_millis")]
    pub last_timestamp: i64,
    pub unread_count: u32,
    pub is_online: bool,
}

/// One message of a history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub message_id: MessageId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub text: String,
    /// Epoch milliseconds.
    #[serde(with = "epoch_millis")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub delivered: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replying_to: Option<MessageId>,
    /// Reaction per user.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub reactions: BTreeMap<UserId, String>,
}

/// Reads an explicit `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
