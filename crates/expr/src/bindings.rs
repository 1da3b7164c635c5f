// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed variable set an expression is evaluated over: `payload`,
//! `device`, `run`, and `results`. Nothing outside this set is ever visible
//! to user-authored code.

use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub payload: Value,
    pub device: Value,
    pub run: Value,
    pub results: Value,
}

impl Bindings {
    pub fn new(payload: Value, device: Value, run: Value, results: Value) -> Self {
        Self { payload, device, run, results }
    }
}
