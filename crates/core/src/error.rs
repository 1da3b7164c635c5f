// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across the engine.
//!
//! Runners never propagate these as Rust panics or bubbled `Err`s out of a
//! run — they are translated into per-device [`crate::result::ExecutionResult`]
//! outcomes. `InvariantViolation` is the one kind that legitimately aborts a
//! run rather than being absorbed into a result.

use thiserror::Error;

/// A device-facing or run-facing failure and its retry/propagation policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A device-level failure expected to be transient; eligible for retry.
    #[error("transient device error: {0}")]
    TransientDevice(String),

    /// A device-level failure known not to improve on retry.
    #[error("permanent device error: {0}")]
    PermanentDevice(String),

    /// Post-execution validation classified the attempt as failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An error raised while evaluating preprocessing/postprocessing/skip/
    /// iteration expressions. Treated as `PermanentDevice` for the device
    /// currently being processed.
    #[error("user code error: {0}")]
    UserCodeError(String),

    /// The state store (shared or local) could not be reached or failed to
    /// apply a write. Non-fatal: the caller falls back to local semantics.
    #[error("state store unreachable: {0}")]
    StateStoreUnreachable(String),

    /// The scheduler daemon could not be reached or timed out.
    #[error("Scheduler Unreachable")]
    SchedulerUnreachable,

    /// The run's `stop` flag was observed at a checkpoint.
    #[error("cancelled")]
    Cancelled,

    /// A structural precondition of the graph was violated (missing
    /// Start/End, duplicate edge, etc). Fails the entire run.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Whether this error kind should be retried by the Runner's per-device
    /// attempt loop.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::TransientDevice(_))
    }
}
