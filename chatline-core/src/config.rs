// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Client Configuration
//!
//! Endpoint URLs and timing parameters for the transport core.
//! Values come from defaults, builder-style overrides or the environment.

use std::time::Duration;

use thiserror::Error;

use crate::network::TransportConfig;

/// Environment variable for the REST base URL.
pub const ENV_API_URL: &str = "CHATLINE_API_URL";
/// Environment variable for the realtime endpoint.
pub const ENV_WS_URL: &str = "CHATLINE_WS_URL";
/// Environment variable for the connect timeout (milliseconds).
pub const ENV_CONNECT_TIMEOUT_MS: &str = "CHATLINE_CONNECT_TIMEOUT_MS";
/// Environment variable for the heartbeat interval (milliseconds).
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "CHATLINE_HEARTBEAT_INTERVAL_MS";
/// Environment variable for the heartbeat timeout (milliseconds).
pub const ENV_HEARTBEAT_TIMEOUT_MS: &str = "CHATLINE_HEARTBEAT_TIMEOUT_MS";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Heartbeat timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Time between probes.
    pub interval: Duration,
    /// How long a probe may go unanswered.
    pub timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        HeartbeatConfig {
            interval: Duration::from_secs(15),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Reconnect backoff bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay for the first attempt, before jitter.
    pub base_delay: Duration,
    /// Cap on the exponential delay, before jitter.
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API (login, conversations, history).
    pub api_base_url: String,
    /// Realtime WebSocket endpoint.
    pub ws_url: String,
    /// Upper bound on opening the realtime transport.
    pub connect_timeout: Duration,
    /// Liveness probe timing.
    pub heartbeat: HeartbeatConfig,
    /// Reconnect backoff.
    pub reconnect: ReconnectConfig,
    /// Quiet period after which "stopped typing" is sent.
    pub typing_quiet_period: Duration,
    /// Default page size for history fetches.
    pub history_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: "http://localhost:8080".to_string(),
            ws_url: "ws://localhost:8080/ws".to_string(),
            connect_timeout: Duration::from_secs(10),
            heartbeat: HeartbeatConfig::default(),
            reconnect: ReconnectConfig::default(),
            typing_quiet_period: Duration::from_secs(2),
            history_page_size: 50,
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given endpoints with default timings.
    pub fn new(api_base_url: &str, ws_url: &str) -> Self {
        ClientConfig {
            api_base_url: api_base_url.to_string(),
            ws_url: ws_url.to_string(),
            ..Default::default()
        }
    }

    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClientConfig::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_WS_URL) {
            config.ws_url = url;
        }
        if let Some(ms) = parse_millis(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            config.connect_timeout = ms;
        }
        if let Some(ms) = parse_millis(&lookup, ENV_HEARTBEAT_INTERVAL_MS)? {
            config.heartbeat.interval = ms;
        }
        if let Some(ms) = parse_millis(&lookup, ENV_HEARTBEAT_TIMEOUT_MS)? {
            config.heartbeat.timeout = ms;
        }

        Ok(config)
    }

    /// Sets the heartbeat timing.
    pub fn with_heartbeat(mut self, interval: Duration, timeout: Duration) -> Self {
        self.heartbeat = HeartbeatConfig { interval, timeout };
        self
    }

    /// Sets the reconnect backoff bounds.
    pub fn with_reconnect(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.reconnect = ReconnectConfig {
            base_delay,
            max_delay,
        };
        self
    }

    /// Sets the typing quiet period.
    pub fn with_typing_quiet_period(mut self, period: Duration) -> Self {
        self.typing_quiet_period = period;
        self
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            server_url: self.ws_url.clone(),
            connect_timeout: self.connect_timeout,
        }
    }
}

fn parse_millis<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
    }
}
