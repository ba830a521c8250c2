//! Chatline Core Library
//!
//! Real-time transport core of a two-party chat client: an authenticated
//! WebSocket connection with heartbeat and reconnect, a strict JSON envelope
//! codec, optimistic message reconciliation and the REST endpoints for
//! login, conversations and history.

pub mod api;
pub mod chat;
pub mod config;
pub mod network;
pub mod rest;

// Re-export commonly used types
pub use api::{
    CallbackHandler, ChannelHandler, ConnectionEvent, EventDispatcher, EventHandler, Session,
};
pub use chat::{
    Conversation, ConversationDirectory, ConversationMessage, DeliveryState, Direction,
    EnvelopeSink, Presence, SeenState,
};
pub use config::{ClientConfig, ConfigError, HeartbeatConfig, ReconnectConfig};
pub use network::{
    ClientEnvelope, Connection, ConnectionState, Credentials, NetworkError, ServerEnvelope,
};
pub use rest::{ApiClient, ApiError, ConversationSummary, HistoryItem};
