// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process `StateStore`: a nested map keyed by runtime, plus per-
//! (runtime, service) append-only log lists. Never unreachable — this is
//! the backend every run falls back to when the shared store errors.

use crate::error::StorageError;
use crate::mode::WriteMode;
use crate::path;
use crate::store::StateStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use wfe_core::{Runtime, ServiceId};

#[derive(Default)]
pub struct LocalStore {
    trees: Mutex<HashMap<Runtime, Value>>,
    logs: Mutex<HashMap<(Runtime, ServiceId), Vec<String>>>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for LocalStore {
    async fn write_state(&self, runtime: &Runtime, path_str: &str, mode: WriteMode) -> Result<(), StorageError> {
        let mut trees = self.trees.lock();
        let tree = trees.entry(runtime.clone()).or_insert(Value::Null);
        match mode {
            WriteMode::Set(value) => path::set(tree, path_str, value),
            WriteMode::Increment(by) => path::increment(tree, path_str, by).map(|_| ()),
            WriteMode::Append(value) => path::append(tree, path_str, value),
        }
    }

    async fn get_state(&self, runtime: &Runtime) -> Result<Value, StorageError> {
        Ok(self.trees.lock().get(runtime).cloned().unwrap_or(Value::Null))
    }

    async fn log_append(&self, runtime: &Runtime, service: ServiceId, line: String) -> Result<(), StorageError> {
        self.logs.lock().entry((runtime.clone(), service)).or_default().push(line);
        Ok(())
    }

    async fn log_range(&self, runtime: &Runtime, service: ServiceId, start_line: usize) -> Result<Vec<String>, StorageError> {
        Ok(self
            .logs
            .lock()
            .get(&(runtime.clone(), service))
            .map(|lines| lines.iter().skip(start_line).cloned().collect())
            .unwrap_or_default())
    }

    async fn clear(&self, runtime: &Runtime) -> Result<(), StorageError> {
        self.trees.lock().remove(runtime);
        self.logs.lock().retain(|(rt, _), _| rt != runtime);
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
