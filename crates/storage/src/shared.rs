// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StateStore` over a flat network [`KvBackend`]. Scalar writes live at
//! `state/{runtime}/scalar/{path}`, appended lists at
//! `state/{runtime}/list/{path}`, log lines at `log/{runtime}/{service}`.
//! Booleans round-trip as the literal strings `"True"`/`"False"` rather than
//! serialized JSON, matching what a plain string-valued KV store is expected
//! to hold; every other scalar is JSON-encoded.

use crate::error::StorageError;
use crate::kv::KvBackend;
use crate::mode::WriteMode;
use crate::path;
use crate::store::StateStore;
use async_trait::async_trait;
use serde_json::Value;
use wfe_core::{Runtime, ServiceId};

pub struct SharedStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> SharedStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn scalar_prefix(runtime: &Runtime) -> String {
        format!("state/{runtime}/scalar/")
    }

    fn list_prefix(runtime: &Runtime) -> String {
        format!("state/{runtime}/list/")
    }

    fn log_key(runtime: &Runtime, service: ServiceId) -> String {
        format!("log/{runtime}/{service}")
    }
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn decode_value(raw: &str) -> Value {
    match raw {
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

#[async_trait]
impl<B: KvBackend> StateStore for SharedStore<B> {
    async fn write_state(&self, runtime: &Runtime, path_str: &str, mode: WriteMode) -> Result<(), StorageError> {
        match mode {
            WriteMode::Set(value) => {
                let key = format!("{}{path_str}", Self::scalar_prefix(runtime));
                self.backend.set(&key, encode_value(&value)).await;
            }
            WriteMode::Increment(by) => {
                let key = format!("{}{path_str}", Self::scalar_prefix(runtime));
                self.backend.increment(&key, by).await;
            }
            WriteMode::Append(value) => {
                let key = format!("{}{path_str}", Self::list_prefix(runtime));
                self.backend.lpush(&key, encode_value(&value)).await;
            }
        }
        Ok(())
    }

    async fn get_state(&self, runtime: &Runtime) -> Result<Value, StorageError> {
        let mut tree = Value::Null;

        let scalar_prefix = Self::scalar_prefix(runtime);
        let scalar_keys = self.backend.keys(&scalar_prefix).await;
        let scalar_values = self.backend.mget(&scalar_keys).await;
        for (key, raw) in scalar_keys.iter().zip(scalar_values) {
            let Some(raw) = raw else { continue };
            let rel_path = &key[scalar_prefix.len()..];
            path::set(&mut tree, rel_path, decode_value(&raw))?;
        }

        let list_prefix = Self::list_prefix(runtime);
        for key in self.backend.keys(&list_prefix).await {
            let rel_path = &key[list_prefix.len()..];
            let items = self.backend.lrange(&key, 0).await;
            let array = Value::Array(items.iter().map(|raw| decode_value(raw)).collect());
            path::set(&mut tree, rel_path, array)?;
        }

        Ok(tree)
    }

    async fn log_append(&self, runtime: &Runtime, service: ServiceId, line: String) -> Result<(), StorageError> {
        self.backend.lpush(&Self::log_key(runtime, service), line).await;
        Ok(())
    }

    async fn log_range(&self, runtime: &Runtime, service: ServiceId, start_line: usize) -> Result<Vec<String>, StorageError> {
        Ok(self.backend.lrange(&Self::log_key(runtime, service), start_line).await)
    }

    async fn clear(&self, runtime: &Runtime) -> Result<(), StorageError> {
        self.backend.delete_prefix(&Self::scalar_prefix(runtime)).await;
        self.backend.delete_prefix(&Self::list_prefix(runtime)).await;
        self.backend.delete_prefix(&format!("log/{runtime}/")).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "shared_tests.rs"]
mod tests;
