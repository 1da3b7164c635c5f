// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("state store unreachable: {0}")]
    Unreachable(String),

    #[error("cannot {op} at path {path:?}: existing value is not a container")]
    NotAContainer { op: &'static str, path: String },

    #[error("cannot increment at path {path:?}: existing value is not a number")]
    NotANumber { path: String },

    #[error("internal error descending into state tree: not an object after coercion")]
    NotAnObject,
}
