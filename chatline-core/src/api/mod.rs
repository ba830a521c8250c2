//! High-level API
//!
//! Session context and connection event callbacks.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use chatline_core::api::{ChannelHandler, EventDispatcher, Session};
//! use chatline_core::network::WebSocketTransport;
//! use chatline_core::ClientConfig;
//!
//! let session = Session::login(ClientConfig::from_env()?, "alice", "hunter2").await?;
//! let (handler, mut events) = ChannelHandler::channel();
//! let connection = session.connect(
//!     WebSocketTransport::new(),
//!     EventDispatcher::with_handler(Arc::new(handler)),
//! );
//! let mut chat = session.open_conversation(&connection, "bob").await?;
//! chat.send_message("hi", None);
//! ```

mod events;
mod session;

pub use events::{CallbackHandler, ChannelHandler, ConnectionEvent, EventDispatcher, EventHandler};
pub use session::Session;
