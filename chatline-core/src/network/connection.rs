// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Manager
//!
//! Owns the realtime transport and drives its lifecycle: open, authenticate,
//! read, write, probe, and reconnect with backoff after transient failures.
//!
//! All I/O runs on background tasks. Every transport gets a generation
//! number; callbacks from a superseded transport are ignored.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::NetworkError;
use super::heartbeat::HeartbeatMonitor;
use super::message::{ClientEnvelope, ServerEnvelope};
use super::protocol::{decode_message, encode_message};
use super::reconnect::ReconnectPolicy;
use super::timer::DelayedTask;
use super::transport::{
    ConnectionState, Frame, FramePipe, FrameReceiver, FrameSender, Transport, TransportConfig,
};
use crate::api::{ConnectionEvent, EventDispatcher};
use crate::config::ClientConfig;

/// Session credentials presented in the `AUTH` frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub token: String,
}

impl Credentials {
    pub fn new(user_id: &str, token: &str) -> Self {
        Credentials {
            user_id: user_id.to_string(),
            token: token.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Realtime connection with authentication, heartbeat and reconnect.
///
/// Cheap to clone; clones share one connection. Dropping the last clone
/// closes the transport and cancels every background task.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use chatline_core::{ChannelHandler, ClientConfig, Connection, Credentials, EventDispatcher};
/// use chatline_core::network::WebSocketTransport;
///
/// let (handler, mut events) = ChannelHandler::channel();
/// let conn = Connection::new(
///     WebSocketTransport::new(),
///     Credentials::new("alice", &token),
///     &ClientConfig::default(),
///     EventDispatcher::with_handler(Arc::new(handler)),
/// );
/// conn.connect();
/// while let Some(event) = events.recv().await {
///     println!("{:?}", event);
/// }
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    credentials: Credentials,
    transport_config: TransportConfig,
    transport: Arc<dyn Transport>,
    events: EventDispatcher,
    shared: Mutex<Shared>,
}

struct Shared {
    state: ConnectionState,
    /// False once the caller disconnected or the server rejected our credentials.
    should_reconnect: bool,
    /// Set by `disconnect()`; later `connect()` calls are ignored.
    closed: bool,
    /// Current transport generation.
    generation: u64,
    /// Queue feeding the single writer task of the current transport.
    outbound: Option<UnboundedSender<Frame>>,
    /// Task that opens the transport and then runs the receive loop.
    reader: Option<JoinHandle<()>>,
    heartbeat: HeartbeatMonitor,
    reconnect_timer: DelayedTask,
    policy: ReconnectPolicy,
}

impl Shared {
    /// Tears down the current transport and invalidates its callbacks.
    fn drop_transport(&mut self) {
        self.generation += 1;
        self.heartbeat.stop();
        // The writer closes the transport once its queue is gone
        self.outbound = None;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Connection {
    /// Creates a disconnected connection. Nothing happens until [`connect`](Self::connect).
    pub fn new<T>(
        transport: T,
        credentials: Credentials,
        config: &ClientConfig,
        events: EventDispatcher,
    ) -> Self
    where
        T: Transport + 'static,
    {
        let shared = Shared {
            state: ConnectionState::Disconnected,
            should_reconnect: false,
            closed: false,
            generation: 0,
            outbound: None,
            reader: None,
            heartbeat: HeartbeatMonitor::new(config.heartbeat),
            reconnect_timer: DelayedTask::new(),
            policy: ReconnectPolicy::from_config(&config.reconnect),
        };

        Connection {
            inner: Arc::new(Inner {
                credentials,
                transport_config: config.transport(),
                transport: Arc::new(transport),
                events,
                shared: Mutex::new(shared),
            }),
        }
    }

    /// Starts connecting in the background.
    ///
    /// No-op unless the connection is `Disconnected`, or after [`disconnect`](Self::disconnect).
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut shared = self.inner.shared.lock();
        if shared.closed || shared.state != ConnectionState::Disconnected {
            debug!("connect() ignored in state {:?}", shared.state);
            return;
        }
        shared.should_reconnect = true;
        shared.reconnect_timer.cancel();
        self.inner.begin_connect(&mut shared);
    }

    /// Closes the connection for good.
    ///
    /// Cancels any pending reconnect, stops the heartbeat, closes the
    /// transport and emits `Disconnected` without an error.
    pub fn disconnect(&self) {
        let mut shared = self.inner.shared.lock();
        if shared.closed {
            return;
        }
        shared.closed = true;
        shared.should_reconnect = false;
        shared.reconnect_timer.cancel();
        shared.drop_transport();
        shared.state = ConnectionState::Disconnected;
        drop(shared);

        info!("Disconnected by caller");
        self.inner
            .events
            .dispatch(ConnectionEvent::Disconnected { error: None });
    }

    /// Queues an envelope on the open transport.
    ///
    /// Without an open transport the envelope is logged and dropped.
    pub fn send(&self, envelope: &ClientEnvelope) {
        let outbound = self.inner.shared.lock().outbound.clone();
        let Some(outbound) = outbound else {
            warn!("Dropping {}: no open transport", envelope.message_type());
            return;
        };

        match encode_message(envelope) {
            Ok(text) => {
                if outbound.send(Frame::Text(text)).is_err() {
                    warn!("Dropping {}: transport closing", envelope.message_type());
                }
            }
            Err(e) => warn!("Dropping {}: {}", envelope.message_type(), e),
        }
    }

    /// Sends a chat message to `to_user_id`.
    pub fn send_chat(&self, to_user_id: &str, text: &str, client_id: &str, replying_to: Option<&str>) {
        self.send(&ClientEnvelope::chat(to_user_id, text, client_id, replying_to));
    }

    /// Tells the server a peer message was displayed.
    pub fn send_seen(&self, message_id: &str) {
        self.send(&ClientEnvelope::seen(message_id));
    }

    /// Sends a typing indicator to `to_user_id`.
    pub fn send_typing(&self, to_user_id: &str, is_typing: bool) {
        self.send(&ClientEnvelope::typing(to_user_id, is_typing));
    }

    /// Adds or replaces our reaction on a message.
    pub fn add_reaction(&self, message_id: &str, to_user_id: &str, reaction: &str) {
        self.send(&ClientEnvelope::add_reaction(message_id, to_user_id, reaction));
    }

    /// Removes our reaction from a message.
    pub fn remove_reaction(&self, message_id: &str, to_user_id: &str) {
        self.send(&ClientEnvelope::remove_reaction(message_id, to_user_id));
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.shared.lock().state.clone()
    }

    /// Returns true once authenticated.
    pub fn is_connected(&self) -> bool {
        self.inner.shared.lock().state == ConnectionState::Connected
    }

    /// Number of reconnect delays computed since the last successful auth.
    pub fn reconnect_attempt(&self) -> u32 {
        self.inner.shared.lock().policy.attempt()
    }

    /// Returns true while a reconnect is scheduled.
    pub fn has_pending_reconnect(&self) -> bool {
        self.inner.shared.lock().reconnect_timer.is_pending()
    }

    /// The credentials this connection authenticates with.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("user_id", &self.inner.credentials.user_id)
            .field("state", &self.state())
            .finish()
    }
}

impl Inner {
    /// Enters `Connecting` and spawns the open + receive task.
    fn begin_connect(self: &Arc<Self>, shared: &mut Shared) {
        shared.state = ConnectionState::Connecting;
        shared.generation += 1;
        let generation = shared.generation;

        debug!(
            "Opening transport to {} (generation {})",
            self.transport_config.server_url, generation
        );
        shared.reader = Some(tokio::spawn(run_transport(Arc::downgrade(self), generation)));
    }

    /// Fired by the reconnect timer.
    fn reconnect_due(self: &Arc<Self>) {
        let mut shared = self.shared.lock();
        if shared.closed || !shared.should_reconnect || shared.state != ConnectionState::Disconnected
        {
            return;
        }
        info!("Reconnecting (attempt {})", shared.policy.attempt());
        self.begin_connect(&mut shared);
    }

    /// Publishes the write queue of a freshly opened transport.
    ///
    /// Returns false when the transport was superseded while opening.
    fn attach(&self, generation: u64, outbound: UnboundedSender<Frame>) -> bool {
        let mut shared = self.shared.lock();
        if shared.generation != generation {
            return false;
        }
        shared.outbound = Some(outbound);
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        self.shared.lock().generation == generation
    }

    /// Handles one inbound frame. Returns false when reading should stop.
    fn handle_frame(self: &Arc<Self>, generation: u64, frame: Frame) -> bool {
        let data = match frame {
            Frame::Text(text) => text.into_bytes(),
            Frame::Binary(data) => data,
            Frame::Pong(payload) => {
                let shared = self.shared.lock();
                if shared.generation == generation {
                    shared.heartbeat.ack(&payload);
                }
                return true;
            }
            // Answered by the transport itself
            Frame::Ping(_) => return true,
        };

        let envelope = match decode_message(&data) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Dropping inbound frame: {}", e);
                return true;
            }
        };

        match envelope {
            ServerEnvelope::AuthOk(payload) => {
                self.on_authenticated(generation, &payload.user_id);
                true
            }
            ServerEnvelope::AuthError(payload) => {
                self.on_rejected(generation, payload.error);
                false
            }
            other => {
                if self.is_current(generation) {
                    self.events.dispatch(ConnectionEvent::Message(other));
                }
                true
            }
        }
    }

    fn on_authenticated(self: &Arc<Self>, generation: u64, user_id: &str) {
        let mut shared = self.shared.lock();
        if shared.generation != generation || shared.state != ConnectionState::Connecting {
            debug!("Ignoring AUTH_OK in state {:?}", shared.state);
            return;
        }

        shared.state = ConnectionState::Connected;
        shared.policy.reset();
        if let Some(outbound) = shared.outbound.clone() {
            let weak = Arc::downgrade(self);
            shared.heartbeat.start(outbound, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_failure(generation, NetworkError::HeartbeatTimeout);
                }
            });
        }
        drop(shared);

        info!("Authenticated as {}", user_id);
        self.events.dispatch(ConnectionEvent::Connected);
    }

    fn on_rejected(&self, generation: u64, reason: String) {
        let mut shared = self.shared.lock();
        if shared.generation != generation {
            return;
        }

        shared.should_reconnect = false;
        shared.reconnect_timer.cancel();
        shared.drop_transport();
        shared.state = ConnectionState::AuthFailed(reason.clone());
        drop(shared);

        warn!("Authentication rejected: {}", reason);
        self.events.dispatch(ConnectionEvent::Disconnected {
            error: Some(NetworkError::AuthenticationFailed(reason)),
        });
    }

    /// Handles a transient failure of the transport with `generation`.
    fn handle_failure(self: &Arc<Self>, generation: u64, error: NetworkError) {
        let mut shared = self.shared.lock();
        if shared.generation != generation || shared.closed {
            debug!("Ignoring failure of stale transport: {}", error);
            return;
        }

        shared.drop_transport();
        shared.state = ConnectionState::Disconnected;

        if shared.should_reconnect {
            let delay = shared.policy.next_delay();
            let weak = Arc::downgrade(self);
            shared.reconnect_timer.schedule(delay, async move {
                if let Some(inner) = weak.upgrade() {
                    inner.reconnect_due();
                }
            });
            info!(
                "Connection lost ({}); reconnecting in {:?} (attempt {})",
                error,
                delay,
                shared.policy.attempt()
            );
        } else {
            info!("Connection lost ({})", error);
        }
        drop(shared);

        self.events
            .dispatch(ConnectionEvent::Disconnected { error: Some(error) });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let shared = self.shared.get_mut();
        if let Some(reader) = shared.reader.take() {
            reader.abort();
        }
    }
}

/// Opens the transport, queues `AUTH` first, then reads until failure.
async fn run_transport(weak: Weak<Inner>, generation: u64) {
    let Some((transport, config, auth)) = weak.upgrade().map(|inner| {
        (
            inner.transport.clone(),
            inner.transport_config.clone(),
            ClientEnvelope::auth(&inner.credentials.user_id, &inner.credentials.token),
        )
    }) else {
        return;
    };

    let opened = transport.open(&config).await;

    let Some(inner) = weak.upgrade() else {
        return;
    };
    let FramePipe { sender, receiver } = match opened {
        Ok(pipe) => pipe,
        Err(e) => {
            inner.handle_failure(generation, e);
            return;
        }
    };

    let auth = match encode_message(&auth) {
        Ok(text) => text,
        Err(e) => {
            inner.handle_failure(generation, e);
            return;
        }
    };

    let (outbound, queue) = mpsc::unbounded_channel();
    // First frame on every transport
    let _ = outbound.send(Frame::Text(auth));
    if !inner.attach(generation, outbound) {
        return;
    }
    tokio::spawn(run_writer(weak.clone(), generation, sender, queue));
    drop(inner);

    run_reader(weak, generation, receiver).await;
}

/// Single writer: drains the queue in order, closes the transport when the
/// queue is dropped.
async fn run_writer(
    weak: Weak<Inner>,
    generation: u64,
    mut sender: Box<dyn FrameSender>,
    mut queue: UnboundedReceiver<Frame>,
) {
    while let Some(frame) = queue.recv().await {
        if let Err(e) = sender.send(frame).await {
            if let Some(inner) = weak.upgrade() {
                inner.handle_failure(generation, e);
            }
            break;
        }
    }

    if let Err(e) = sender.close().await {
        debug!("Transport close failed: {}", e);
    }
}

async fn run_reader(weak: Weak<Inner>, generation: u64, mut receiver: Box<dyn FrameReceiver>) {
    loop {
        let received = receiver.receive().await;

        let Some(inner) = weak.upgrade() else {
            return;
        };
        match received {
            Ok(frame) => {
                if !inner.handle_frame(generation, frame) {
                    return;
                }
            }
            Err(e) => {
                inner.handle_failure(generation, e);
                return;
            }
        }
    }
}
