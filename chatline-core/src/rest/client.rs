// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! REST Client
//!
//! Login, conversation list and history over HTTPS.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::ApiError;
use super::types::{ConversationSummary, HistoryItem, LoginRequest, LoginResponse};

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the chat server's REST endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .user_agent(format!("Chatline/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            client,
            base_url: Self::normalize(base_url)?,
        })
    }

    /// Base URL all endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchanges a user id and password for a bearer token.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            user_id: user_id.to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.endpoint("login")?).json(&body);
        self.execute(request).await
    }

    /// Fetches the conversation list, newest first.
    pub async fn fetch_conversations(
        &self,
        token: &str,
    ) -> Result<Vec<ConversationSummary>, ApiError> {
        let request = self
            .client
            .get(self.endpoint("conversations")?)
            .bearer_auth(token);

        let mut conversations: Vec<ConversationSummary> = self.execute(request).await?;
        conversations.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
        Ok(conversations)
    }

    /// Fetches up to `limit` messages exchanged with `peer_id`.
    ///
    /// `before` (epoch milliseconds) selects the page preceding that instant.
    pub async fn fetch_history(
        &self,
        token: &str,
        peer_id: &str,
        limit: u32,
        before: Option<i64>,
    ) -> Result<Vec<HistoryItem>, ApiError> {
        let mut url = self.endpoint("history")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("user", peer_id);
            query.append_pair("limit", &limit.to_string());
            if let Some(before) = before {
                query.append_pair("before", &before.to_string());
            }
        }

        let request = self.client.get(url).bearer_auth(token);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());

        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    /// Parses the base URL and makes sure relative joins append to its path.
    fn normalize(base_url: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}
