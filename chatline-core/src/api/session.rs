// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session
//!
//! Explicit session context produced by login: credentials, configuration
//! and the REST client. Everything that needs the signed-in user takes a
//! `Session` instead of reaching for global state.

use std::sync::Arc;

use tracing::info;

use crate::chat::{Conversation, ConversationDirectory};
use crate::config::ClientConfig;
use crate::network::{Connection, Credentials, Transport};
use crate::rest::{ApiClient, ApiError, ConversationSummary, HistoryItem};

use super::events::EventDispatcher;

/// A signed-in user.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    config: ClientConfig,
    api: ApiClient,
}

impl Session {
    /// Logs in with a user id and password.
    pub async fn login(config: ClientConfig, user_id: &str, password: &str) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_base_url)?;
        let response = api.login(user_id, password).await?;
        info!("Logged in as {}", response.user_id);

        Ok(Session {
            credentials: Credentials::new(&response.user_id, &response.token),
            config,
            api,
        })
    }

    /// Resumes a session from credentials obtained earlier.
    pub fn resume(config: ClientConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_base_url)?;
        Ok(Session {
            credentials,
            config,
            api,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn user_id(&self) -> &str {
        &self.credentials.user_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Fetches the conversation list, newest first.
    pub async fn fetch_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        self.api.fetch_conversations(&self.credentials.token).await
    }

    /// Fetches the conversation list into a fresh directory.
    pub async fn load_directory(&self) -> Result<ConversationDirectory, ApiError> {
        let mut directory = ConversationDirectory::new(self.user_id());
        directory.replace(self.fetch_conversations().await?);
        Ok(directory)
    }

    /// Fetches one page of history with `peer_id`, using the configured page size.
    pub async fn fetch_history(
        &self,
        peer_id: &str,
        before: Option<i64>,
    ) -> Result<Vec<HistoryItem>, ApiError> {
        self.api
            .fetch_history(
                &self.credentials.token,
                peer_id,
                self.config.history_page_size,
                before,
            )
            .await
    }

    /// Creates the realtime connection for this session and starts connecting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect<T>(&self, transport: T, events: EventDispatcher) -> Connection
    where
        T: Transport + 'static,
    {
        let connection = Connection::new(transport, self.credentials.clone(), &self.config, events);
        connection.connect();
        connection
    }

    /// Opens a conversation with `peer_id` that sends through `connection`.
    pub fn conversation(&self, connection: &Connection, peer_id: &str) -> Conversation {
        Conversation::new(
            self.user_id(),
            peer_id,
            Arc::new(connection.clone()),
            self.config.typing_quiet_period,
        )
    }

    /// Opens a conversation and loads its latest history page.
    pub async fn open_conversation(
        &self,
        connection: &Connection,
        peer_id: &str,
    ) -> Result<Conversation, ApiError> {
        let mut conversation = self.conversation(connection, peer_id);
        conversation.load_history(self.fetch_history(peer_id, None).await?);
        Ok(conversation)
    }
}
