// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! REST Error Types

use thiserror::Error;

/// Errors returned by the REST client. Never retried by the core.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Base URL or endpoint could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (DNS, TLS, connect, timeout).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx status.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// Body did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true for 401/403, which mean the token or password was refused.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::HttpStatus(401) | ApiError::HttpStatus(403))
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
