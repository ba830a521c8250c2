// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Heartbeat Monitor
//!
//! Periodic ping probe over an open transport. Each probe carries a sequence
//! number; a pong echoing that number (or a later one) answers it. A probe
//! that goes unanswered for the configured timeout, or that cannot be queued,
//! raises the timeout callback exactly once and ends the run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc::UnboundedSender, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::transport::Frame;
use crate::config::HeartbeatConfig;

struct HeartbeatRun {
    task: JoinHandle<()>,
    acked: watch::Sender<u64>,
    sent: Arc<AtomicU64>,
}

/// Liveness probe for one transport at a time.
#[derive(Debug)]
pub struct HeartbeatMonitor {
    config: HeartbeatConfig,
    run: Option<HeartbeatRun>,
}

impl std::fmt::Debug for HeartbeatRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatRun")
            .field("sent", &self.sent.load(Ordering::SeqCst))
            .field("acked", &*self.acked.borrow())
            .finish()
    }
}

impl HeartbeatMonitor {
    /// Creates a stopped monitor.
    pub fn new(config: HeartbeatConfig) -> Self {
        HeartbeatMonitor { config, run: None }
    }

    /// Starts probing through `outbound`. Stops any previous run first.
    ///
    /// The first probe goes out one interval after start. `on_timeout` runs
    /// at most once, from the monitor's own task.
    pub fn start<F>(&mut self, outbound: UnboundedSender<Frame>, on_timeout: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.stop();

        let (acked, mut acks) = watch::channel(0u64);
        let sent = Arc::new(AtomicU64::new(0));
        let interval = self.config.interval;
        let timeout = self.config.timeout;
        let task_sent = sent.clone();

        let task = tokio::spawn(async move {
            let mut seq = 0u64;
            loop {
                tokio::time::sleep(interval).await;

                seq += 1;
                task_sent.store(seq, Ordering::SeqCst);
                if outbound.send(Frame::Ping(seq.to_be_bytes().to_vec())).is_err() {
                    warn!("Heartbeat probe {} could not be queued", seq);
                    break;
                }

                let answered = async {
                    loop {
                        if *acks.borrow_and_update() >= seq {
                            return;
                        }
                        if acks.changed().await.is_err() {
                            std::future::pending::<()>().await;
                        }
                    }
                };
                if tokio::time::timeout(timeout, answered).await.is_err() {
                    warn!("Heartbeat probe {} unanswered after {:?}", seq, timeout);
                    break;
                }
                debug!("Heartbeat probe {} answered", seq);
            }
            on_timeout();
        });

        self.run = Some(HeartbeatRun { task, acked, sent });
    }

    /// Records a pong. Payloads that don't carry a sequence number answer the
    /// latest probe.
    pub fn ack(&self, payload: &[u8]) {
        let Some(run) = &self.run else {
            return;
        };

        let seq = <[u8; 8]>::try_from(payload)
            .map(u64::from_be_bytes)
            .unwrap_or_else(|_| run.sent.load(Ordering::SeqCst));

        run.acked.send_if_modified(|acked| {
            if seq > *acked {
                *acked = seq;
                true
            } else {
                false
            }
        });
    }

    /// Stops probing. Idempotent.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.task.abort();
        }
    }

    /// Returns true while a run is active.
    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .map(|run| !run.task.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for HeartbeatMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
