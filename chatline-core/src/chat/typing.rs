// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typing Debouncer
//!
//! Turns raw input activity into at most one "typing" notice per active
//! period and a single "stopped typing" notice after a quiet period.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::EnvelopeSink;
use crate::network::{ClientEnvelope, DelayedTask, UserId};

/// Debounces typing notices towards one peer.
pub struct TypingDebouncer {
    peer_id: UserId,
    sink: Arc<dyn EnvelopeSink>,
    quiet_period: Duration,
    active: Arc<Mutex<bool>>,
    quiet_timer: DelayedTask,
}

impl TypingDebouncer {
    pub fn new(peer_id: &str, sink: Arc<dyn EnvelopeSink>, quiet_period: Duration) -> Self {
        TypingDebouncer {
            peer_id: peer_id.to_string(),
            sink,
            quiet_period,
            active: Arc::new(Mutex::new(false)),
            quiet_timer: DelayedTask::new(),
        }
    }

    /// Records input activity.
    ///
    /// Sends `typing=true` when a new active period begins and re-arms the
    /// quiet timer. Must be called from within a tokio runtime.
    pub fn input_activity(&mut self) {
        let started = {
            let mut active = self.active.lock();
            !std::mem::replace(&mut *active, true)
        };
        if started {
            self.sink
                .send_envelope(&ClientEnvelope::typing(&self.peer_id, true));
        }

        let active = self.active.clone();
        let sink = self.sink.clone();
        let peer_id = self.peer_id.clone();
        self.quiet_timer.schedule(self.quiet_period, async move {
            let was_active = std::mem::replace(&mut *active.lock(), false);
            if was_active {
                sink.send_envelope(&ClientEnvelope::typing(&peer_id, false));
            }
        });
    }

    /// Ends the active period immediately, e.g. because a message was sent.
    pub fn stop(&mut self) {
        self.quiet_timer.cancel();
        let was_active = std::mem::replace(&mut *self.active.lock(), false);
        if was_active {
            self.sink
                .send_envelope(&ClientEnvelope::typing(&self.peer_id, false));
        }
    }

    /// Returns true while a "typing" notice is outstanding.
    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }
}
