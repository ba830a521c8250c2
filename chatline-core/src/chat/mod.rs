//! Chat State
//!
//! Client-side view of conversations built on top of the connection's event
//! stream: per-conversation message reconciliation, typing debounce and the
//! conversation list.

mod conversation;
mod directory;
mod typing;

pub use conversation::{
    Conversation, ConversationMessage, DeliveryState, Direction, PendingSend, Presence, SeenState,
};
pub use directory::ConversationDirectory;
pub use typing::TypingDebouncer;

use crate::network::{ClientEnvelope, Connection};

/// Outbound side used by chat state to reach the server.
pub trait EnvelopeSink: Send + Sync {
    /// Queues an envelope. Delivery failures are the sink's concern.
    fn send_envelope(&self, envelope: &ClientEnvelope);
}

impl EnvelopeSink for Connection {
    fn send_envelope(&self, envelope: &ClientEnvelope) {
        self.send(envelope);
    }
}

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
