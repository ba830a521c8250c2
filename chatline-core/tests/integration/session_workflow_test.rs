// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Workflow Integration Tests
//!
//! Login, conversation list and history through `Session`.

use serde_json::json;

use chatline_core::network::MockTransport;
use chatline_core::{ClientConfig, Credentials, EventDispatcher, Session};

use crate::common::server::{FakeServer, TOKEN};

fn config_for(server: &FakeServer) -> ClientConfig {
    ClientConfig::new(&server.base_url, "ws://mock/ws")
}

/// Test: Login yields credentials used by every later request
#[tokio::test]
async fn test_login_then_load_directory() {
    let server = FakeServer::start().await;
    server.set_conversations(json!([
        { "peerId": "bob", "lastMessage": "yo", "lastTimestamp": 10,
          "unreadCount": 2, "isOnline": true },
        { "peerId": "carol", "lastMessage": "bye", "lastTimestamp": 20,
          "unreadCount": 0, "isOnline": false },
    ]));

    let session = Session::login(config_for(&server), "alice", "secret")
        .await
        .unwrap();
    assert_eq!(session.user_id(), "alice");
    assert_eq!(session.credentials().token, TOKEN);

    let directory = session.load_directory().await.unwrap();
    assert_eq!(directory.len(), 2);
    assert_eq!(directory.summaries()[0].peer_id, "carol");
    assert_eq!(directory.total_unread(), 2);
}

/// Test: Wrong password surfaces as unauthorized, no session
#[tokio::test]
async fn test_login_rejected() {
    let server = FakeServer::start().await;
    let err = Session::login(config_for(&server), "alice", "guess")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

/// Test: History pages use the configured page size and cursor
#[tokio::test]
async fn test_history_paging() {
    let server = FakeServer::start().await;
    let mut config = config_for(&server);
    config.history_page_size = 2;
    let session = Session::resume(config, Credentials::new("alice", TOKEN)).unwrap();

    server.set_history(json!([
        { "messageId": "m-3", "fromUserId": "bob", "toUserId": "alice",
          "text": "c", "createdAt": 30 },
        { "messageId": "m-4", "fromUserId": "alice", "toUserId": "bob",
          "text": "d", "createdAt": 40, "delivered": true },
    ]));
    let transport = MockTransport::new();
    let connection = session.connect(transport.clone(), EventDispatcher::new());
    let mut conversation = session.open_conversation(&connection, "bob").await.unwrap();
    assert_eq!(conversation.messages().len(), 2);
    assert_eq!(conversation.oldest_timestamp(), Some(30));

    server.set_history(json!([
        { "messageId": "m-1", "fromUserId": "bob", "toUserId": "alice",
          "text": "a", "createdAt": 10 },
        { "messageId": "m-2", "fromUserId": "alice", "toUserId": "bob",
          "text": "b", "createdAt": 20 },
    ]));
    let older = session
        .fetch_history("bob", conversation.oldest_timestamp())
        .await
        .unwrap();
    assert_eq!(conversation.prepend_history(older), 2);

    let ids: Vec<&str> = conversation.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m-1", "m-2", "m-3", "m-4"]);

    let queries = server.history_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("2"));
    assert!(!queries[0].contains_key("before"));
    assert_eq!(queries[1].get("before").map(String::as_str), Some("30"));

    connection.disconnect();
}

/// Test: An expired token fails REST calls without touching the session
#[tokio::test]
async fn test_resumed_session_with_stale_token() {
    let server = FakeServer::start().await;
    let session =
        Session::resume(config_for(&server), Credentials::new("alice", "expired")).unwrap();

    let err = session.fetch_conversations().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(session.user_id(), "alice");
}
