// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation
//!
//! Reconciles optimistic local state with server-confirmed state for one
//! two-party conversation.
//!
//! A message sent locally is shown immediately under a fresh client id. When
//! the server confirms it with `MESSAGE_DELIVERED`, the message is renamed in
//! place to the durable id, exactly once. Seen receipts, reactions, typing and
//! presence notices are applied to the same view.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use super::typing::TypingDebouncer;
use super::{now_millis, EnvelopeSink};
use crate::network::{ClientEnvelope, ClientId, MessageId, ServerEnvelope, UserId};
use crate::rest::HistoryItem;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Mine,
    Theirs,
}

/// Whether the recipient has displayed a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenState {
    Unseen,
    Seen,
}

/// Whether the server has stored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Shown optimistically under its client id.
    Pending,
    /// Known to the server under its message id.
    Delivered,
}

/// Peer presence as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Unknown,
    Online,
    Offline {
        /// Epoch milliseconds.
        last_seen: i64,
    },
}

/// One message of the conversation view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMessage {
    /// Client id while pending, server message id once delivered.
    pub id: String,
    pub text: String,
    pub direction: Direction,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub seen: SeenState,
    pub delivery: DeliveryState,
    pub replying_to: Option<MessageId>,
    /// At most one reaction per user.
    pub reactions: BTreeMap<UserId, String>,
}

impl ConversationMessage {
    /// Builds a view entry from a history item.
    pub fn from_history(item: HistoryItem, my_user_id: &str) -> Self {
        let direction = if item.from_user_id == my_user_id {
            Direction::Mine
        } else {
            Direction::Theirs
        };

        ConversationMessage {
            id: item.message_id,
            text: item.text,
            direction,
            timestamp: item.created_at,
            seen: if item.seen {
                SeenState::Seen
            } else {
                SeenState::Unseen
            },
            delivery: DeliveryState::Delivered,
            replying_to: item.replying_to,
            reactions: item.reactions,
        }
    }

    pub fn is_mine(&self) -> bool {
        self.direction == Direction::Mine
    }
}

/// A locally sent message awaiting its delivery receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub client_id: ClientId,
    pub to_user_id: UserId,
    pub text: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub replying_to: Option<MessageId>,
}

/// Client-side state of one conversation.
pub struct Conversation {
    my_user_id: UserId,
    peer_id: UserId,
    sink: Arc<dyn EnvelopeSink>,
    messages: Vec<ConversationMessage>,
    pending: HashMap<ClientId, PendingSend>,
    peer_typing: bool,
    presence: Presence,
    typing: TypingDebouncer,
}

impl Conversation {
    /// Creates an empty conversation between `my_user_id` and `peer_id`.
    pub fn new(
        my_user_id: &str,
        peer_id: &str,
        sink: Arc<dyn EnvelopeSink>,
        typing_quiet_period: Duration,
    ) -> Self {
        Conversation {
            my_user_id: my_user_id.to_string(),
            peer_id: peer_id.to_string(),
            typing: TypingDebouncer::new(peer_id, sink.clone(), typing_quiet_period),
            sink,
            messages: Vec::new(),
            pending: HashMap::new(),
            peer_typing: false,
            presence: Presence::Unknown,
        }
    }

    pub fn my_user_id(&self) -> &str {
        &self.my_user_id
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Messages in display order, oldest first.
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Looks up a message by its current id.
    pub fn message(&self, id: &str) -> Option<&ConversationMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Sends still awaiting a delivery receipt.
    pub fn pending(&self) -> impl Iterator<Item = &PendingSend> {
        self.pending.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn peer_is_typing(&self) -> bool {
        self.peer_typing
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Timestamp of the oldest message, for paging backwards through history.
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.messages.iter().map(|m| m.timestamp).min()
    }

    /// Number of peer messages not yet marked seen.
    pub fn unseen_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.direction == Direction::Theirs && m.seen == SeenState::Unseen)
            .count()
    }

    /// Sends a chat message and shows it optimistically.
    ///
    /// Surrounding whitespace is trimmed; blank text sends nothing and
    /// returns `None`. Otherwise returns the client id the message is shown
    /// under until the server confirms it.
    pub fn send_message(&mut self, text: &str, replying_to: Option<&str>) -> Option<ClientId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.typing.stop();

        let client_id = Uuid::new_v4().to_string();
        let created_at = now_millis();

        self.messages.push(ConversationMessage {
            id: client_id.clone(),
            text: text.to_string(),
            direction: Direction::Mine,
            timestamp: created_at,
            seen: SeenState::Unseen,
            delivery: DeliveryState::Pending,
            replying_to: replying_to.map(str::to_string),
            reactions: BTreeMap::new(),
        });
        self.pending.insert(
            client_id.clone(),
            PendingSend {
                client_id: client_id.clone(),
                to_user_id: self.peer_id.clone(),
                text: text.to_string(),
                created_at,
                replying_to: replying_to.map(str::to_string),
            },
        );

        self.sink.send_envelope(&ClientEnvelope::chat(
            &self.peer_id,
            text,
            &client_id,
            replying_to,
        ));
        Some(client_id)
    }

    /// Applies an inbound envelope. Returns true if the view changed.
    ///
    /// Envelopes about other conversations are ignored.
    pub fn apply(&mut self, envelope: &ServerEnvelope) -> bool {
        match envelope {
            ServerEnvelope::Chat(payload) => {
                if payload.from_user_id != self.peer_id {
                    return false;
                }
                if self.message(&payload.message_id).is_some() {
                    debug!("Duplicate message {}", payload.message_id);
                    return false;
                }
                self.messages.push(ConversationMessage {
                    id: payload.message_id.clone(),
                    text: payload.text.clone(),
                    direction: Direction::Theirs,
                    timestamp: payload.created_at,
                    seen: SeenState::Unseen,
                    delivery: DeliveryState::Delivered,
                    replying_to: payload.replying_to.clone(),
                    reactions: BTreeMap::new(),
                });
                true
            }
            ServerEnvelope::MessageDelivered(payload) => {
                self.confirm_delivery(&payload.client_id, &payload.message_id)
            }
            ServerEnvelope::MessageSeen(payload) => {
                match self.message_mut(&payload.message_id) {
                    Some(message) if message.is_mine() && message.seen == SeenState::Unseen => {
                        message.seen = SeenState::Seen;
                        true
                    }
                    _ => false,
                }
            }
            ServerEnvelope::AddReaction(payload) => {
                self.set_reaction(&payload.message_id, &payload.user_id, Some(&payload.reaction))
            }
            ServerEnvelope::RemoveReaction(payload) => {
                self.set_reaction(&payload.message_id, &payload.user_id, None)
            }
            ServerEnvelope::UserTyping(payload) => {
                if payload.from_user_id != self.peer_id || self.peer_typing == payload.is_typing {
                    return false;
                }
                self.peer_typing = payload.is_typing;
                true
            }
            ServerEnvelope::UserOnline(payload) if payload.user_id == self.peer_id => {
                self.update_presence(Presence::Online)
            }
            ServerEnvelope::UserOffline(payload) if payload.user_id == self.peer_id => {
                self.update_presence(Presence::Offline {
                    last_seen: payload.last_seen,
                })
            }
            _ => false,
        }
    }

    /// Marks a peer message as seen and tells the server.
    ///
    /// Returns false, sending nothing, for unknown ids, own messages and
    /// messages already marked.
    pub fn mark_seen(&mut self, message_id: &str) -> bool {
        match self.message_mut(message_id) {
            Some(message)
                if message.direction == Direction::Theirs
                    && message.seen == SeenState::Unseen =>
            {
                message.seen = SeenState::Seen;
            }
            _ => return false,
        }
        self.sink.send_envelope(&ClientEnvelope::seen(message_id));
        true
    }

    /// Marks every unseen peer message as seen. Returns how many were marked.
    pub fn mark_all_seen(&mut self) -> usize {
        let unseen: Vec<MessageId> = self
            .messages
            .iter()
            .filter(|m| m.direction == Direction::Theirs && m.seen == SeenState::Unseen)
            .map(|m| m.id.clone())
            .collect();

        let mut marked = 0;
        for id in &unseen {
            if self.mark_seen(id) {
                marked += 1;
            }
        }
        marked
    }

    /// Adds or replaces our reaction and tells the server.
    ///
    /// Only messages the server knows about can carry reactions.
    pub fn add_reaction(&mut self, message_id: &str, reaction: &str) -> bool {
        if !self.is_delivered(message_id) {
            return false;
        }
        let my_user_id = self.my_user_id.clone();
        self.set_reaction(message_id, &my_user_id, Some(reaction));
        self.sink.send_envelope(&ClientEnvelope::add_reaction(
            message_id,
            &self.peer_id,
            reaction,
        ));
        true
    }

    /// Removes our reaction and tells the server.
    pub fn remove_reaction(&mut self, message_id: &str) -> bool {
        if !self.is_delivered(message_id) {
            return false;
        }
        let my_user_id = self.my_user_id.clone();
        if !self.set_reaction(message_id, &my_user_id, None) {
            return false;
        }
        self.sink
            .send_envelope(&ClientEnvelope::remove_reaction(message_id, &self.peer_id));
        true
    }

    /// Records input activity for the typing indicator.
    ///
    /// Must be called from within a tokio runtime.
    pub fn input_activity(&mut self) {
        self.typing.input_activity();
    }

    /// Returns true while we have told the peer we are typing.
    pub fn is_typing(&self) -> bool {
        self.typing.is_active()
    }

    /// Rebuilds the view from a history page.
    ///
    /// Messages still awaiting delivery stay at the end of the view.
    pub fn load_history(&mut self, items: Vec<HistoryItem>) {
        let mut messages: Vec<ConversationMessage> = items
            .into_iter()
            .map(|item| ConversationMessage::from_history(item, &self.my_user_id))
            .collect();
        let mut seen_ids = HashSet::new();
        messages.retain(|m| seen_ids.insert(m.id.clone()));
        messages.sort_by_key(|m| m.timestamp);

        let pending: Vec<ConversationMessage> = self
            .messages
            .drain(..)
            .filter(|m| m.delivery == DeliveryState::Pending && self.pending.contains_key(&m.id))
            .collect();
        messages.extend(pending);

        self.messages = messages;
    }

    /// Prepends an older history page. Returns how many messages were added.
    pub fn prepend_history(&mut self, items: Vec<HistoryItem>) -> usize {
        let mut known: HashSet<String> = self.messages.iter().map(|m| m.id.clone()).collect();
        let mut older: Vec<ConversationMessage> = items
            .into_iter()
            .filter(|item| known.insert(item.message_id.clone()))
            .map(|item| ConversationMessage::from_history(item, &self.my_user_id))
            .collect();
        older.sort_by_key(|m| m.timestamp);

        let added = older.len();
        older.append(&mut self.messages);
        self.messages = older;
        added
    }

    /// Rewrites a pending message to its durable id. No-op for unknown or
    /// already confirmed client ids.
    ///
    /// When a history page already brought in the durable copy, the
    /// optimistic entry is dropped instead.
    fn confirm_delivery(&mut self, client_id: &str, message_id: &str) -> bool {
        if self.pending.remove(client_id).is_none() {
            debug!("Delivery receipt for unknown client id {}", client_id);
            return false;
        }

        if self.message(message_id).is_some() {
            debug!("{} already known, dropping optimistic copy {}", message_id, client_id);
            let before = self.messages.len();
            self.messages.retain(|m| m.id != client_id);
            return self.messages.len() != before;
        }

        match self.message_mut(client_id) {
            Some(message) => {
                message.id = message_id.to_string();
                message.delivery = DeliveryState::Delivered;
                true
            }
            None => false,
        }
    }

    fn set_reaction(&mut self, message_id: &str, user_id: &str, reaction: Option<&str>) -> bool {
        let Some(message) = self.message_mut(message_id) else {
            return false;
        };

        match reaction {
            Some(reaction) => {
                let previous = message
                    .reactions
                    .insert(user_id.to_string(), reaction.to_string());
                previous.as_deref() != Some(reaction)
            }
            None => message.reactions.remove(user_id).is_some(),
        }
    }

    fn update_presence(&mut self, presence: Presence) -> bool {
        if self.presence == presence {
            return false;
        }
        self.presence = presence;
        true
    }

    fn is_delivered(&self, message_id: &str) -> bool {
        self.message(message_id)
            .map(|m| m.delivery == DeliveryState::Delivered)
            .unwrap_or(false)
    }

    fn message_mut(&mut self, id: &str) -> Option<&mut ConversationMessage> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}
