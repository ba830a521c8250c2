// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! In-memory transport for tests. Every successful [`Transport::open`] hands
//! the server side of the new pipe to the test as a [`MockPeer`], which can
//! read what the client wrote and push frames or failures back.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc::{
    self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender,
};

use super::error::NetworkError;
use super::message::{ClientEnvelope, ServerEnvelope};
use super::protocol::{decode_client_message, encode_server_message};
use super::transport::{
    Frame, FramePipe, FrameReceiver, FrameSender, Transport, TransportConfig, TransportResult,
};

struct MockState {
    injected_errors: VecDeque<NetworkError>,
    open_count: usize,
    auto_pong: bool,
    last_config: Option<TransportConfig>,
    peers_tx: UnboundedSender<MockPeer>,
}

/// Mock transport for testing.
///
/// Cheap to clone; clones share the same state so a test can keep a handle
/// while the connection owns another.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    peers_rx: Arc<tokio::sync::Mutex<UnboundedReceiver<MockPeer>>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        MockTransport {
            state: Arc::new(Mutex::new(MockState {
                injected_errors: VecDeque::new(),
                open_count: 0,
                auto_pong: false,
                last_config: None,
                peers_tx,
            })),
            peers_rx: Arc::new(tokio::sync::Mutex::new(peers_rx)),
        }
    }

    /// Makes the next `open` fail with the given error.
    pub fn inject_error(&self, error: NetworkError) {
        self.state.lock().injected_errors.push_back(error);
    }

    /// Answers every ping with a pong automatically.
    pub fn set_auto_pong(&self, enabled: bool) {
        self.state.lock().auto_pong = enabled;
    }

    /// Number of `open` calls so far, failed ones included.
    pub fn open_count(&self) -> usize {
        self.state.lock().open_count
    }

    /// Config passed to the most recent `open`.
    pub fn last_config(&self) -> Option<TransportConfig> {
        self.state.lock().last_config.clone()
    }

    /// Waits for the next successfully opened pipe.
    pub async fn accept(&self) -> Option<MockPeer> {
        self.peers_rx.lock().await.recv().await
    }

    /// Returns an already opened pipe without waiting.
    pub fn try_accept(&self) -> Option<MockPeer> {
        self.peers_rx.try_lock().ok()?.try_recv().ok()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, config: &TransportConfig) -> TransportResult<FramePipe> {
        let mut state = self.state.lock();
        state.open_count += 1;
        state.last_config = Some(config.clone());

        if let Some(error) = state.injected_errors.pop_front() {
            return Err(error);
        }

        let (to_client_tx, to_client_rx) = mpsc::unbounded_channel();
        let (from_client_tx, from_client_rx) = mpsc::unbounded_channel();
        let fail_sends = Arc::new(AtomicBool::new(false));

        let sender = MockSender {
            outgoing: Some(from_client_tx),
            loopback: to_client_tx.downgrade(),
            auto_pong: state.auto_pong,
            fail_sends: fail_sends.clone(),
        };
        let receiver = MockReceiver {
            incoming: to_client_rx,
        };

        let peer = MockPeer {
            from_client: from_client_rx,
            to_client: to_client_tx,
            fail_sends,
        };
        // The test may have dropped its handle; the pipe still works
        let _ = state.peers_tx.send(peer);

        Ok(FramePipe {
            sender: Box::new(sender),
            receiver: Box::new(receiver),
        })
    }
}

struct MockSender {
    outgoing: Option<UnboundedSender<Frame>>,
    loopback: WeakUnboundedSender<TransportResult<Frame>>,
    auto_pong: bool,
    fail_sends: Arc<AtomicBool>,
}

#[async_trait]
impl FrameSender for MockSender {
    async fn send(&mut self, frame: Frame) -> TransportResult<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(NetworkError::SendFailed("injected send failure".into()));
        }

        let outgoing = self.outgoing.as_ref().ok_or(NetworkError::ConnectionClosed)?;
        outgoing
            .send(frame.clone())
            .map_err(|_| NetworkError::ConnectionClosed)?;

        if let (true, Frame::Ping(data)) = (self.auto_pong, frame) {
            if let Some(loopback) = self.loopback.upgrade() {
                let _ = loopback.send(Ok(Frame::Pong(data)));
            }
        }

        Ok(())
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.outgoing = None;
        Ok(())
    }
}

struct MockReceiver {
    incoming: UnboundedReceiver<TransportResult<Frame>>,
}

#[async_trait]
impl FrameReceiver for MockReceiver {
    async fn receive(&mut self) -> TransportResult<Frame> {
        match self.incoming.recv().await {
            Some(result) => result,
            None => Err(NetworkError::ConnectionClosed),
        }
    }
}

/// Server side of one mock pipe.
///
/// Dropping the peer closes the pipe from the server side.
pub struct MockPeer {
    from_client: UnboundedReceiver<Frame>,
    to_client: UnboundedSender<TransportResult<Frame>>,
    fail_sends: Arc<AtomicBool>,
}

impl MockPeer {
    /// Waits for the next frame the client wrote. `None` once the client closed.
    pub async fn recv_frame(&mut self) -> Option<Frame> {
        self.from_client.recv().await
    }

    /// Waits for the next decodable client envelope, skipping control frames.
    pub async fn recv_envelope(&mut self) -> Option<ClientEnvelope> {
        loop {
            let frame = self.from_client.recv().await?;
            if let Some(envelope) = Self::decode(frame) {
                return Some(envelope);
            }
        }
    }

    /// Returns every client envelope written so far without waiting.
    pub fn drain_envelopes(&mut self) -> Vec<ClientEnvelope> {
        let mut envelopes = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            envelopes.extend(Self::decode(frame));
        }
        envelopes
    }

    /// Waits until the client closes its side, discarding anything still queued.
    pub async fn closed(&mut self) {
        while self.from_client.recv().await.is_some() {}
    }

    /// Sends a server envelope to the client.
    pub fn send(&self, envelope: &ServerEnvelope) -> bool {
        match encode_server_message(envelope) {
            Ok(text) => self.send_frame(Frame::Text(text)),
            Err(_) => false,
        }
    }

    /// Sends raw text to the client, e.g. malformed JSON.
    pub fn send_text(&self, text: &str) -> bool {
        self.send_frame(Frame::Text(text.to_string()))
    }

    /// Sends an arbitrary frame to the client.
    pub fn send_frame(&self, frame: Frame) -> bool {
        self.to_client.send(Ok(frame)).is_ok()
    }

    /// Makes the client's next receive fail with the given error.
    pub fn fail(&self, error: NetworkError) {
        let _ = self.to_client.send(Err(error));
    }

    /// Makes every subsequent client write fail.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    fn decode(frame: Frame) -> Option<ClientEnvelope> {
        match frame {
            Frame::Text(text) => decode_client_message(text.as_bytes()).ok(),
            Frame::Binary(data) => decode_client_message(&data).ok(),
            Frame::Ping(_) | Frame::Pong(_) => None,
        }
    }
}
