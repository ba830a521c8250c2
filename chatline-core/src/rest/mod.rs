//! REST Interfaces
//!
//! Login, conversation list and message history. Failures come back as
//! [`ApiError`]; retries are left to the caller.

mod client;
mod error;
mod types;

pub use client::{ApiClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::ApiError;
pub use types::{ConversationSummary, HistoryItem, LoginRequest, LoginResponse};
