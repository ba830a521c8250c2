// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Shared helpers, fixtures, and utilities used across test modules.
//! Not every test binary uses every helper.

#![allow(dead_code)]

pub mod fixtures;
pub mod server;
pub mod strategies;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use chatline_core::network::{MockPeer, MockTransport};
use chatline_core::{
    ChannelHandler, ClientConfig, ClientEnvelope, Connection, ConnectionEvent, Credentials,
    EnvelopeSink, EventDispatcher, ServerEnvelope,
};

/// Sink that records every envelope instead of sending it.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<ClientEnvelope>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingSink::default())
    }

    pub fn sent(&self) -> Vec<ClientEnvelope> {
        self.sent.lock().clone()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&self) -> Vec<ClientEnvelope> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl EnvelopeSink for RecordingSink {
    fn send_envelope(&self, envelope: &ClientEnvelope) {
        self.sent.lock().push(envelope.clone());
    }
}

/// A connection over a mock transport, with its event stream.
pub struct Harness {
    pub transport: MockTransport,
    pub conn: Connection,
    pub events: UnboundedReceiver<ConnectionEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let transport = MockTransport::new();
        let (handler, events) = ChannelHandler::channel();
        let conn = Connection::new(
            transport.clone(),
            Credentials::new("alice", "alice-token"),
            &config,
            EventDispatcher::with_handler(Arc::new(handler)),
        );
        Harness {
            transport,
            conn,
            events,
        }
    }

    /// Waits for the next event. Panics if none arrives within two minutes.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        tokio::time::timeout(Duration::from_secs(120), self.events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    /// Waits for the next pipe the connection opens.
    pub async fn accept(&self) -> MockPeer {
        tokio::time::timeout(Duration::from_secs(120), self.transport.accept())
            .await
            .expect("timed out waiting for transport")
            .expect("mock transport gone")
    }

    /// Accepts the next pipe, checks the AUTH frame and answers AUTH_OK.
    pub async fn authenticate(&mut self) -> MockPeer {
        let mut peer = self.accept().await;
        let auth = peer.recv_envelope().await.expect("no AUTH frame");
        assert_eq!(auth, ClientEnvelope::auth("alice", "alice-token"));

        peer.send(&fixtures::auth_ok("alice"));
        assert_eq!(self.next_event().await, ConnectionEvent::Connected);
        peer
    }

    /// Connects and completes the handshake.
    pub async fn establish(&mut self) -> MockPeer {
        self.conn.connect();
        self.authenticate().await
    }

    /// Returns true if no event is queued right now.
    pub fn no_pending_events(&mut self) -> bool {
        self.events.try_recv().is_err()
    }
}

/// Unwraps a `Message` event.
pub fn message_of(event: ConnectionEvent) -> ServerEnvelope {
    match event {
        ConnectionEvent::Message(envelope) => envelope,
        other => panic!("expected Message event, got {:?}", other),
    }
}
