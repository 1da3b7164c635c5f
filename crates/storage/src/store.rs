// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::StorageError;
use crate::mode::WriteMode;
use async_trait::async_trait;
use serde_json::Value;
use wfe_core::{Runtime, ServiceId};

/// Key/value live-state plus a per-service log queue for one run.
///
/// Implementations MUST NOT surface a backend outage as anything other than
/// [`StorageError::Unreachable`] — a Runner degrades to local semantics on
/// that error rather than aborting the run.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Write `value` at `path` under `runtime`, combined per `mode`.
    async fn write_state(&self, runtime: &Runtime, path: &str, mode: WriteMode) -> Result<(), StorageError>;

    /// The full nested tree for `runtime`, assembled from flat keys on the
    /// shared backend or returned directly from the local backend's map.
    async fn get_state(&self, runtime: &Runtime) -> Result<Value, StorageError>;

    /// Append one log line for `(runtime, service)`.
    async fn log_append(&self, runtime: &Runtime, service: ServiceId, line: String) -> Result<(), StorageError>;

    /// Log lines for `(runtime, service)` from `start_line` (0-based) to the
    /// end, in insertion order.
    async fn log_range(&self, runtime: &Runtime, service: ServiceId, start_line: usize) -> Result<Vec<String>, StorageError>;

    /// Tear down a completed run's live state and logs.
    async fn clear(&self, runtime: &Runtime) -> Result<(), StorageError>;
}
