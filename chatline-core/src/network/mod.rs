//! Network + Transport Layer
//!
//! Realtime channel between the client and the chat server.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Transport trait**: Platform-agnostic interface for network I/O
//! - **Message types**: Typed envelopes for both directions
//! - **Protocol layer**: JSON encoding and strict decoding
//! - **Reconnect policy**: Exponential backoff with jitter
//! - **Heartbeat monitor**: Ping/pong liveness probe
//! - **Connection**: Authentication handshake and lifecycle state machine
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use chatline_core::network::{Connection, Credentials, MockTransport};
//! use chatline_core::{ChannelHandler, ClientConfig, EventDispatcher};
//!
//! // Create a connection over the mock transport (for testing)
//! let transport = MockTransport::new();
//! let (handler, mut events) = ChannelHandler::channel();
//! let conn = Connection::new(
//!     transport.clone(),
//!     Credentials::new("alice", "token"),
//!     &ClientConfig::default(),
//!     EventDispatcher::with_handler(Arc::new(handler)),
//! );
//!
//! // Connect and talk
//! conn.connect();
//! conn.send_chat("bob", "hi", &client_id, None);
//! ```

mod connection;
mod error;
mod heartbeat;
mod message;
mod mock;
mod protocol;
mod reconnect;
mod timer;
mod transport;
mod websocket;

pub(crate) use message::epoch_millis;

// Error types
pub use error::NetworkError;

// Message types
pub use message::{
    AddReactionPayload, AuthErrorPayload, AuthOkPayload, AuthPayload, ChatMessagePayload,
    ChatPayload, ClientEnvelope, ClientId, MessageDeliveredPayload, MessageId, MessageSeenPayload,
    ReactionAddedPayload, ReactionRemovedPayload, RemoveReactionPayload, ServerEnvelope,
    ServerErrorPayload, TypingPayload, UserId, UserOfflinePayload, UserOnlinePayload,
    UserTypingPayload,
};

// Protocol utilities
pub use protocol::{
    decode_client_message, decode_message, decode_text, encode_message, encode_server_message,
    MAX_MESSAGE_SIZE,
};

// Transport abstraction
pub use transport::{
    ConnectionState, Frame, FramePipe, FrameReceiver, FrameSender, Transport, TransportConfig,
    TransportResult,
};

// Mock transport for testing
pub use mock::{MockPeer, MockTransport};

// WebSocket transport for production
pub use websocket::WebSocketTransport;

// Timing
pub use heartbeat::HeartbeatMonitor;
pub use reconnect::{ReconnectPolicy, JITTER_FRACTION, MIN_RECONNECT_DELAY};
pub use timer::DelayedTask;

// Connection management
pub use connection::{Connection, Credentials};
