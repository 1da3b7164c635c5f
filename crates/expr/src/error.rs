// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failures from parsing or evaluating a user-authored expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("failed to parse expression `{0}`: {1}")]
    Parse(String, String),

    #[error("failed to evaluate expression `{0}`: {1}")]
    Eval(String, String),

    #[error("expression `{0}` did not evaluate to the expected type: {1}")]
    TypeMismatch(String, String),

    #[error("custom code hook `{0}` is not registered")]
    UnknownHook(String),
}
