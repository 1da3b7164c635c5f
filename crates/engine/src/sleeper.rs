// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async counterpart to [`wfe_core::Clock`]: retries and other wait points
//! need to suspend without blocking a worker thread, which a synchronous
//! clock can't express. Kept as its own seam so tests run retry loops
//! instantly instead of waiting on real wall-clock time.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps for real using the tokio timer.
#[derive(Clone, Default)]
pub struct RealSleeper;

#[async_trait]
impl Sleeper for RealSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested durations without actually waiting. Retry-loop and
/// backoff tests use this so they run in milliseconds.
#[derive(Clone, Default)]
pub struct InstantSleeper {
    requested: Arc<Mutex<Vec<Duration>>>,
}

impl InstantSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.requested.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
#[path = "sleeper_tests.rs"]
mod tests;
