// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fake REST Server
//!
//! A local axum server speaking the login, conversations and history
//! endpoints. Accepts `alice`/`secret` and the bearer token `alice-token`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const TOKEN: &str = "alice-token";

#[derive(Default)]
pub struct ServerState {
    /// Body returned by `GET /conversations`.
    pub conversations: Mutex<Value>,
    /// Body returned by `GET /history`.
    pub history: Mutex<Value>,
    /// Query string of the last history request.
    pub history_queries: Mutex<Vec<HashMap<String, String>>>,
    /// When set, every endpoint answers with this raw body.
    pub raw_body: Mutex<Option<String>>,
}

pub struct FakeServer {
    pub base_url: String,
    pub state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(ServerState {
            conversations: Mutex::new(json!([])),
            history: Mutex::new(json!([])),
            ..Default::default()
        });

        let app = Router::new()
            .route("/login", post(login))
            .route("/conversations", get(conversations))
            .route("/history", get(history))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake server");
        });

        FakeServer {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn set_conversations(&self, body: Value) {
        *self.state.conversations.lock() = body;
    }

    pub fn set_history(&self, body: Value) {
        *self.state.history.lock() = body;
    }

    pub fn set_raw_body(&self, body: &str) {
        *self.state.raw_body.lock() = Some(body.to_string());
    }

    pub fn history_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.history_queries.lock().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn raw(state: &ServerState) -> Option<Response> {
    state
        .raw_body
        .lock()
        .clone()
        .map(|body| (StatusCode::OK, body).into_response())
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn login(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> Response {
    if let Some(response) = raw(&state) {
        return response;
    }
    if body["userId"] == "alice" && body["password"] == "secret" {
        Json(json!({ "token": TOKEN, "userId": "alice" })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad credentials" }))).into_response()
    }
}

async fn conversations(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(response) = raw(&state) {
        return response;
    }
    let body = state.conversations.lock().clone();
    Json(body).into_response()
}

async fn history(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    state.history_queries.lock().push(query);
    if let Some(response) = raw(&state) {
        return response;
    }
    let body = state.history.lock().clone();
    Json(body).into_response()
}
