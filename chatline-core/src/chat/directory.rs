// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation Directory
//!
//! The conversation list, newest first, kept current from inbound events.

use crate::network::{ServerEnvelope, UserId};
use crate::rest::ConversationSummary;

/// Conversation list with unread counters and presence flags.
#[derive(Debug, Clone, Default)]
pub struct ConversationDirectory {
    my_user_id: UserId,
    summaries: Vec<ConversationSummary>,
    open_peer: Option<UserId>,
}

impl ConversationDirectory {
    pub fn new(my_user_id: &str) -> Self {
        ConversationDirectory {
            my_user_id: my_user_id.to_string(),
            summaries: Vec::new(),
            open_peer: None,
        }
    }

    /// Replaces the list, e.g. with a fresh `GET /conversations` result.
    pub fn replace(&mut self, summaries: Vec<ConversationSummary>) {
        self.summaries = summaries;
        self.sort();
    }

    /// Summaries, newest first.
    pub fn summaries(&self) -> &[ConversationSummary] {
        &self.summaries
    }

    pub fn get(&self, peer_id: &str) -> Option<&ConversationSummary> {
        self.summaries.iter().find(|s| s.peer_id == peer_id)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Sum of all unread counters.
    pub fn total_unread(&self) -> u32 {
        self.summaries.iter().map(|s| s.unread_count).sum()
    }

    /// Marks the conversation currently on screen; its messages don't count as unread.
    ///
    /// Opening a conversation also clears its counter.
    pub fn set_open(&mut self, peer_id: Option<&str>) {
        self.open_peer = peer_id.map(str::to_string);
        if let Some(peer_id) = peer_id {
            self.mark_read(peer_id);
        }
    }

    pub fn open_peer(&self) -> Option<&str> {
        self.open_peer.as_deref()
    }

    /// Zeroes the unread counter. Returns true if it was non-zero.
    pub fn mark_read(&mut self, peer_id: &str) -> bool {
        match self.summary_mut(peer_id) {
            Some(summary) if summary.unread_count > 0 => {
                summary.unread_count = 0;
                true
            }
            _ => false,
        }
    }

    /// Records one of our own messages as the latest in a conversation.
    pub fn record_sent(&mut self, peer_id: &str, text: &str, timestamp: i64) {
        let summary = self.summary_or_insert(peer_id);
        summary.last_message = text.to_string();
        summary.last_timestamp = timestamp;
        self.sort();
    }

    /// Applies an inbound envelope. Returns true if the list changed.
    pub fn apply(&mut self, envelope: &ServerEnvelope) -> bool {
        match envelope {
            ServerEnvelope::Chat(payload) => {
                if payload.from_user_id == self.my_user_id {
                    return false;
                }
                let counts_unread = self.open_peer.as_deref() != Some(payload.from_user_id.as_str());

                let summary = self.summary_or_insert(&payload.from_user_id);
                summary.last_message = payload.text.clone();
                summary.last_timestamp = payload.created_at;
                if counts_unread {
                    summary.unread_count = summary.unread_count.saturating_add(1);
                }
                self.sort();
                true
            }
            ServerEnvelope::UserOnline(payload) => self.set_online(&payload.user_id, true),
            ServerEnvelope::UserOffline(payload) => self.set_online(&payload.user_id, false),
            _ => false,
        }
    }

    fn set_online(&mut self, peer_id: &str, online: bool) -> bool {
        match self.summary_mut(peer_id) {
            Some(summary) if summary.is_online != online => {
                summary.is_online = online;
                true
            }
            _ => false,
        }
    }

    fn summary_mut(&mut self, peer_id: &str) -> Option<&mut ConversationSummary> {
        self.summaries.iter_mut().find(|s| s.peer_id == peer_id)
    }

    fn summary_or_insert(&mut self, peer_id: &str) -> &mut ConversationSummary {
        let index = match self.summaries.iter().position(|s| s.peer_id == peer_id) {
            Some(index) => index,
            None => {
                self.summaries.push(ConversationSummary {
                    peer_id: peer_id.to_string(),
                    last_message: String::new(),
                    last_timestamp: 0,
                    unread_count: 0,
                    is_online: false,
                });
                self.summaries.len() - 1
            }
        };
        &mut self.summaries[index]
    }

    fn sort(&mut self) {
        self.summaries
            .sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
    }
}
