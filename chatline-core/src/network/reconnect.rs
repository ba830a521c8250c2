// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconnect Policy
//!
//! Exponential backoff with symmetric jitter. The only state is the attempt
//! counter; the policy never sleeps itself.

use std::time::Duration;

use rand::Rng;

use crate::config::ReconnectConfig;

/// Smallest delay ever returned.
pub const MIN_RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// Jitter applied in both directions, as a fraction of the delay.
pub const JITTER_FRACTION: f64 = 0.2;

/// Backoff calculator for reconnect attempts.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_delay: Duration,
    attempt: u32,
}

impl ReconnectPolicy {
    /// Creates a policy with the given base and cap.
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        ReconnectPolicy {
            base_delay,
            max_delay,
            attempt: 0,
        }
    }

    /// Creates a policy from configuration.
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(config.base_delay, config.max_delay)
    }

    /// Number of delays computed since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay before the next attempt, before jitter.
    pub fn current_base_delay(&self) -> Duration {
        // 2^31 overflows any realistic base; clamp the exponent early
        let factor = 2f64.powi(self.attempt.min(31) as i32);
        let delay = self.base_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }

    /// Computes the next delay using the thread-local RNG.
    pub fn next_delay(&mut self) -> Duration {
        self.next_delay_with(&mut rand::thread_rng())
    }

    /// Computes the next delay with an explicit RNG.
    pub fn next_delay_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Duration {
        let delay = self.current_base_delay().as_secs_f64();
        let jitter = delay * JITTER_FRACTION;
        let offset = if jitter > 0.0 {
            rng.gen_range(-jitter..=jitter)
        } else {
            0.0
        };

        self.attempt = self.attempt.saturating_add(1);

        let jittered = (delay + offset).max(MIN_RECONNECT_DELAY.as_secs_f64());
        Duration::from_secs_f64(jittered)
    }

    /// Resets the attempt counter after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}
