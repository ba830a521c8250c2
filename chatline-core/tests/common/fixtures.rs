// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test Fixtures
//!
//! Builders for server envelopes and REST payloads.

use std::collections::BTreeMap;

use chatline_core::network::{
    AuthErrorPayload, AuthOkPayload, ChatMessagePayload, MessageDeliveredPayload,
    MessageSeenPayload, ReactionAddedPayload, ReactionRemovedPayload, ServerErrorPayload,
    UserOfflinePayload, UserOnlinePayload, UserTypingPayload,
};
use chatline_core::{ConversationSummary, HistoryItem, ServerEnvelope};

pub fn auth_ok(user_id: &str) -> ServerEnvelope {
    ServerEnvelope::AuthOk(AuthOkPayload {
        user_id: user_id.to_string(),
    })
}

pub fn auth_error(reason: &str) -> ServerEnvelope {
    ServerEnvelope::AuthError(AuthErrorPayload {
        error: reason.to_string(),
    })
}

pub fn chat_from(from: &str, message_id: &str, text: &str, created_at: i64) -> ServerEnvelope {
    ServerEnvelope::Chat(ChatMessagePayload {
        from_user_id: from.to_string(),
        text: text.to_string(),
        message_id: message_id.to_string(),
        created_at,
        replying_to: None,
        client_id: None,
    })
}

pub fn delivered(client_id: &str, message_id: &str) -> ServerEnvelope {
    ServerEnvelope::MessageDelivered(MessageDeliveredPayload {
        message_id: message_id.to_string(),
        client_id: client_id.to_string(),
    })
}

pub fn seen(message_id: &str) -> ServerEnvelope {
    ServerEnvelope::MessageSeen(MessageSeenPayload {
        message_id: message_id.to_string(),
    })
}

pub fn reaction_added(message_id: &str, user_id: &str, reaction: &str) -> ServerEnvelope {
    ServerEnvelope::AddReaction(ReactionAddedPayload {
        message_id: message_id.to_string(),
        user_id: user_id.to_string(),
        reaction: reaction.to_string(),
    })
}

pub fn reaction_removed(message_id: &str, user_id: &str) -> ServerEnvelope {
    ServerEnvelope::RemoveReaction(ReactionRemovedPayload {
        message_id: message_id.to_string(),
        user_id: user_id.to_string(),
    })
}

pub fn typing(from: &str, is_typing: bool) -> ServerEnvelope {
    ServerEnvelope::UserTyping(UserTypingPayload {
        from_user_id: from.to_string(),
        is_typing,
    })
}

pub fn online(user_id: &str) -> ServerEnvelope {
    ServerEnvelope::UserOnline(UserOnlinePayload {
        user_id: user_id.to_string(),
    })
}

pub fn offline(user_id: &str, last_seen: i64) -> ServerEnvelope {
    ServerEnvelope::UserOffline(UserOfflinePayload {
        user_id: user_id.to_string(),
        last_seen,
    })
}

pub fn server_error(message: &str) -> ServerEnvelope {
    ServerEnvelope::Error(ServerErrorPayload {
        error: message.to_string(),
    })
}

pub fn history_item(id: &str, from: &str, to: &str, text: &str, created_at: i64) -> HistoryItem {
    HistoryItem {
        message_id: id.to_string(),
        from_user_id: from.to_string(),
        to_user_id: to.to_string(),
        text: text.to_string(),
        created_at,
        delivered: true,
        seen: false,
        replying_to: None,
        reactions: BTreeMap::new(),
    }
}

pub fn summary(peer_id: &str, last_message: &str, last_timestamp: i64, unread: u32) -> ConversationSummary {
    ConversationSummary {
        peer_id: peer_id.to_string(),
        last_message: last_message.to_string(),
        last_timestamp,
        unread_count: unread,
        is_online: false,
    }
}
