//! Event System
//!
//! Callbacks for connection events.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::network::{NetworkError, ServerEnvelope};

/// Events emitted by a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// The server accepted our credentials.
    Connected,

    /// The transport went away.
    Disconnected {
        /// Cause of the loss; `None` after an explicit disconnect.
        error: Option<NetworkError>,
    },

    /// An inbound envelope other than the auth replies.
    Message(ServerEnvelope),
}

/// Event handler trait.
///
/// Implement this trait to receive connection events. Handlers run inline on
/// the receive task, in arrival order, so they should return quickly.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: ConnectionEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(ConnectionEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ConnectionEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ConnectionEvent) + Send + Sync,
{
    fn on_event(&self, event: ConnectionEvent) {
        (self.callback)(event);
    }
}

/// Forwards events into an unbounded channel for async consumers.
pub struct ChannelHandler {
    tx: UnboundedSender<ConnectionEvent>,
}

impl ChannelHandler {
    /// Creates a handler and the receiving end of its channel.
    pub fn channel() -> (Self, UnboundedReceiver<ConnectionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelHandler { tx }, rx)
    }
}

impl EventHandler for ChannelHandler {
    fn on_event(&self, event: ConnectionEvent) {
        // Receiver gone means nobody is listening any more
        let _ = self.tx.send(event);
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Creates a dispatcher with a single handler.
    pub fn with_handler(handler: Arc<dyn EventHandler>) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.add_handler(handler);
        dispatcher
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: ConnectionEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
