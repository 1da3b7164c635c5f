// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A `RunRegistry` keyed by [`Runtime`], constructed and torn down by the
//! Run Controller, replacing what would otherwise be process-global mutable
//! maps (run targets, stop flags) with an owned, testable handle.

use crate::device::DeviceSet;
use crate::run::Runtime;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Maps a runtime to its permitted device set, written once at Run start and
/// read by descendants; removed at Run finalization.
#[derive(Clone, Default)]
pub struct RunRegistry {
    targets: Arc<Mutex<HashMap<Runtime, DeviceSet>>>,
    stop_tokens: Arc<Mutex<HashMap<Runtime, CancellationToken>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run's permitted device set and give it a fresh
    /// cancellation token, parented to `parent` so a parent's `stop` is
    /// inherited by children.
    pub fn register(&self, runtime: Runtime, devices: DeviceSet, parent: Option<&Runtime>) -> CancellationToken {
        let token = match parent.and_then(|p| self.stop_tokens.lock().get(p).cloned()) {
            Some(parent_token) => parent_token.child_token(),
            None => CancellationToken::new(),
        };
        self.targets.lock().insert(runtime.clone(), devices);
        self.stop_tokens.lock().insert(runtime, token.clone());
        token
    }

    pub fn targets(&self, runtime: &Runtime) -> Option<DeviceSet> {
        self.targets.lock().get(runtime).cloned()
    }

    pub fn stop_token(&self, runtime: &Runtime) -> Option<CancellationToken> {
        self.stop_tokens.lock().get(runtime).cloned()
    }

    /// Set this run's `stop` flag.
    pub fn stop(&self, runtime: &Runtime) {
        if let Some(token) = self.stop_tokens.lock().get(runtime) {
            token.cancel();
        }
    }

    pub fn is_stopped(&self, runtime: &Runtime) -> bool {
        self.stop_tokens.lock().get(runtime).map(|t| t.is_cancelled()).unwrap_or(false)
    }

    /// Remove a run's entries at finalization.
    pub fn finalize(&self, runtime: &Runtime) {
        self.targets.lock().remove(runtime);
        self.stop_tokens.lock().remove(runtime);
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
