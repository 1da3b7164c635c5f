// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::Value;

/// How a `write_state` call combines with whatever is already at the path.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteMode {
    /// Overwrite whatever is at the path.
    Set(Value),
    /// Add `by` to the numeric value at the path (0 if absent). Atomic on
    /// the shared backend.
    Increment(i64),
    /// Push onto the array at the path, creating it if absent.
    Append(Value),
}
