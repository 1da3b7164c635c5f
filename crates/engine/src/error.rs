// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;
use wfe_core::EngineError;
use wfe_storage::StorageError;

/// Failures that can legitimately abort a run, as opposed to the
/// [`EngineError`] kinds a Runner absorbs into a per-device result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
