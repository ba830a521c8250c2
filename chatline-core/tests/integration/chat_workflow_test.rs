// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Workflow Integration Tests
//!
//! A resumed session talking to a scripted peer over the mock transport.

use std::sync::Arc;
use std::time::Duration;

use chatline_core::network::{ClientEnvelope, MockPeer, MockTransport};
use chatline_core::{
    ChannelHandler, ClientConfig, ConnectionEvent, ConnectionState, ConversationDirectory,
    Credentials, DeliveryState, EventDispatcher, NetworkError, SeenState, Session,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::common::fixtures;

const WAIT: Duration = Duration::from_secs(10);

fn session() -> Session {
    let config = ClientConfig::new("http://localhost:1", "ws://mock/ws");
    Session::resume(config, Credentials::new("alice", "alice-token")).unwrap()
}

async fn next_event(events: &mut UnboundedReceiver<ConnectionEvent>) -> ConnectionEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn handshake(transport: &MockTransport, events: &mut UnboundedReceiver<ConnectionEvent>) -> MockPeer {
    let mut peer = tokio::time::timeout(WAIT, transport.accept())
        .await
        .expect("timed out waiting for transport")
        .unwrap();
    assert_eq!(
        peer.recv_envelope().await.unwrap(),
        ClientEnvelope::auth("alice", "alice-token")
    );
    peer.send(&fixtures::auth_ok("alice"));
    assert_eq!(next_event(events).await, ConnectionEvent::Connected);
    peer
}

/// Test: Send, deliver, read receipt and a reply, end to end
#[tokio::test]
async fn test_conversation_round_trip() {
    let session = session();
    let transport = MockTransport::new();
    let (handler, mut events) = ChannelHandler::channel();
    let connection = session.connect(
        transport.clone(),
        EventDispatcher::with_handler(Arc::new(handler)),
    );
    let mut peer = handshake(&transport, &mut events).await;

    let mut directory = ConversationDirectory::new(session.user_id());
    let mut chat = session.conversation(&connection, "bob");

    // Outbound message reaches the server with our client id
    let client_id = chat.send_message("hi bob", None).unwrap();
    directory.record_sent("bob", "hi bob", chat.messages()[0].timestamp);
    match peer.recv_envelope().await.unwrap() {
        ClientEnvelope::Chat(payload) => {
            assert_eq!(payload.client_id, client_id);
            assert_eq!(payload.to_user_id, "bob");
            assert_eq!(payload.text, "hi bob");
        }
        other => panic!("expected chat, got {:?}", other),
    }

    // Server confirms, peer reads, peer replies
    peer.send(&fixtures::delivered(&client_id, "m-1"));
    peer.send(&fixtures::seen("m-1"));
    peer.send(&fixtures::chat_from("bob", "m-2", "hi alice", 2_000_000_000_000));

    for _ in 0..3 {
        match next_event(&mut events).await {
            ConnectionEvent::Message(envelope) => {
                chat.apply(&envelope);
                directory.apply(&envelope);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    let sent = chat.message("m-1").unwrap();
    assert_eq!(sent.delivery, DeliveryState::Delivered);
    assert_eq!(sent.seen, SeenState::Seen);
    assert_eq!(chat.messages()[1].id, "m-2");
    assert_eq!(directory.get("bob").unwrap().last_message, "hi alice");
    assert_eq!(directory.get("bob").unwrap().unread_count, 1);

    // Reading the reply notifies the server
    assert_eq!(chat.mark_all_seen(), 1);
    assert_eq!(
        peer.recv_envelope().await.unwrap(),
        ClientEnvelope::seen("m-2")
    );

    connection.disconnect();
    assert_eq!(
        next_event(&mut events).await,
        ConnectionEvent::Disconnected { error: None }
    );
}

/// Test: A dropped transport reconnects and the pending send still reconciles
#[tokio::test]
async fn test_reconnect_keeps_pending_send() {
    let session = session();
    let transport = MockTransport::new();
    let (handler, mut events) = ChannelHandler::channel();
    let connection = session.connect(
        transport.clone(),
        EventDispatcher::with_handler(Arc::new(handler)),
    );
    let mut peer = handshake(&transport, &mut events).await;
    let mut chat = session.conversation(&connection, "bob");

    let client_id = chat.send_message("are you there?", None).unwrap();
    assert!(matches!(
        peer.recv_envelope().await.unwrap(),
        ClientEnvelope::Chat(_)
    ));

    // Server goes away before confirming
    peer.fail(NetworkError::ReceiveFailed("reset".into()));
    assert!(matches!(
        next_event(&mut events).await,
        ConnectionEvent::Disconnected { error: Some(_) }
    ));
    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert!(connection.has_pending_reconnect());

    let peer = handshake(&transport, &mut events).await;
    assert_eq!(transport.open_count(), 2);
    assert_eq!(connection.reconnect_attempt(), 0);

    peer.send(&fixtures::delivered(&client_id, "m-7"));
    match next_event(&mut events).await {
        ConnectionEvent::Message(envelope) => assert!(chat.apply(&envelope)),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(chat.pending_count(), 0);
    assert_eq!(chat.messages()[0].id, "m-7");

    connection.disconnect();
}

/// Test: Rejected credentials end the session's connection for good
#[tokio::test]
async fn test_auth_rejected_is_terminal() {
    let session = session();
    let transport = MockTransport::new();
    let (handler, mut events) = ChannelHandler::channel();
    let connection = session.connect(
        transport.clone(),
        EventDispatcher::with_handler(Arc::new(handler)),
    );

    let mut peer = tokio::time::timeout(WAIT, transport.accept())
        .await
        .unwrap()
        .unwrap();
    peer.recv_envelope().await.unwrap();
    peer.send(&fixtures::auth_error("token expired"));

    assert_eq!(
        next_event(&mut events).await,
        ConnectionEvent::Disconnected {
            error: Some(NetworkError::AuthenticationFailed("token expired".into()))
        }
    );
    assert_eq!(
        connection.state(),
        ConnectionState::AuthFailed("token expired".into())
    );
    assert!(!connection.has_pending_reconnect());

    connection.connect();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.open_count(), 1);
}
