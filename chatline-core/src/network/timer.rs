// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Delayed Task
//!
//! Cancellable one-shot timer on the tokio clock.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A one-shot action that runs after a delay unless cancelled first.
///
/// Scheduling again replaces the previous action. Dropping the task cancels it.
#[derive(Debug, Default)]
pub struct DelayedTask {
    handle: Option<JoinHandle<()>>,
}

impl DelayedTask {
    /// Creates an idle task.
    pub fn new() -> Self {
        DelayedTask { handle: None }
    }

    /// Runs `action` after `delay`, cancelling anything scheduled earlier.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Cancels the scheduled action. No-op when idle.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Returns true while an action is scheduled and has not finished.
    pub fn is_pending(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
