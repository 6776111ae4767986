// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interval-driven background refresh.
//!
//! Each consumer runs its own poller; ticks are skipped while the session
//! gate is closed so nothing is sent after logout.

use crate::session::SessionContext;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running poller.
pub struct Poller {
    stop: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl Poller {
    /// Run `tick` every `interval`, starting immediately.
    pub fn spawn<F, Fut>(interval: Duration, session: SessionContext, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (stop, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut runs = 0u64;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !session.should_make_requests() {
                            tracing::trace!("Poll skipped: not authenticated");
                            continue;
                        }
                        tick().await;
                        runs += 1;
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!(runs, "Poller stopped");
            runs
        });

        Self { stop, task }
    }

    /// Stop polling and wait for the task; returns how many ticks ran.
    pub async fn stop(self) -> u64 {
        let _ = self.stop.send(true);
        self.task.await.unwrap_or(0)
    }
}
