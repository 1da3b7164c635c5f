// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The primitive operations a network key/value store must expose for
//! [`crate::shared::SharedStore`] to build the `StateStore` contract on top
//! of. Wiring a real backend (Redis or similar) means implementing this
//! trait against its client; [`InProcessKvBackend`] is the in-memory stand-in
//! used by tests and by any deployment that hasn't wired a real one yet.

use async_trait::async_trait;

#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn mget(&self, keys: &[String]) -> Vec<Option<String>>;
    async fn set(&self, key: &str, value: String);
    async fn keys(&self, prefix: &str) -> Vec<String>;
    /// Atomically add `by` to the integer at `key` (0 if absent) and return
    /// the new value.
    async fn increment(&self, key: &str, by: i64) -> i64;
    async fn lpush(&self, key: &str, value: String);
    async fn lrange(&self, key: &str, start: usize) -> Vec<String>;
    async fn delete_prefix(&self, prefix: &str);
}

#[derive(Default)]
pub struct InProcessKvBackend {
    scalars: parking_lot::Mutex<std::collections::HashMap<String, String>>,
    lists: parking_lot::Mutex<std::collections::HashMap<String, Vec<String>>>,
}

impl InProcessKvBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for InProcessKvBackend {
    async fn get(&self, key: &str) -> Option<String> {
        self.scalars.lock().get(key).cloned()
    }

    async fn mget(&self, keys: &[String]) -> Vec<Option<String>> {
        let scalars = self.scalars.lock();
        keys.iter().map(|k| scalars.get(k).cloned()).collect()
    }

    async fn set(&self, key: &str, value: String) {
        self.scalars.lock().insert(key.to_string(), value);
    }

    async fn keys(&self, prefix: &str) -> Vec<String> {
        self.scalars.lock().keys().filter(|k| k.starts_with(prefix)).cloned().collect()
    }

    async fn increment(&self, key: &str, by: i64) -> i64 {
        let mut scalars = self.scalars.lock();
        let current = scalars.get(key).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
        let updated = current + by;
        scalars.insert(key.to_string(), updated.to_string());
        updated
    }

    async fn lpush(&self, key: &str, value: String) {
        self.lists.lock().entry(key.to_string()).or_default().push(value);
    }

    async fn lrange(&self, key: &str, start: usize) -> Vec<String> {
        self.lists.lock().get(key).map(|items| items.iter().skip(start).cloned().collect()).unwrap_or_default()
    }

    async fn delete_prefix(&self, prefix: &str) {
        self.scalars.lock().retain(|k, _| !k.starts_with(prefix));
        self.lists.lock().retain(|k, _| !k.starts_with(prefix));
    }
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod tests;
