// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recognized configuration keys and the environment variables that
//! override them at boot. Loaded from TOML, layering file defaults under
//! environment overrides.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateStoreKind {
    Shared,
    Local,
}

impl Default for StateStoreKind {
    fn default() -> Self {
        StateStoreKind::Local
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateStoreConfig {
    #[serde(default)]
    pub kind: StateStoreKind,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_count")]
    pub default_count: u32,
    #[serde(default = "default_retry_backoff")]
    pub default_backoff_seconds: u64,
}

fn default_retry_count() -> u32 {
    0
}

fn default_retry_backoff() -> u64 {
    10
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { default_count: default_retry_count(), default_backoff_seconds: default_retry_backoff() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_max_processes")]
    pub max_processes_default: u32,
}

fn default_max_processes() -> u32 {
    1
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { max_processes_default: default_max_processes() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    pub server: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub tls: bool,
    pub sender: Option<String>,
    pub reply_to: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub custom_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub state_store: StateStoreConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Apply the recognized environment variables on top of file config:
    /// `SCHEDULER_ADDR`, `STATE_STORE_ADDR` (formerly `REDIS_ADDR`),
    /// `FERNET_KEY`, `MAIL_PASSWORD`.
    pub fn apply_env(&mut self, env: &impl EnvSource) {
        if let Some(v) = env.get("SCHEDULER_ADDR") {
            self.scheduler.address = Some(v);
        }
        if let Some(v) = env.get("STATE_STORE_ADDR").or_else(|| env.get("REDIS_ADDR")) {
            self.state_store.address = Some(v);
        }
        if let Some(v) = env.get("FERNET_KEY") {
            self.secrets.encryption_key = Some(v);
        }
        // MAIL_PASSWORD is consumed directly by the notification adapter at
        // send time (wfe-adapters), never stored on Config, so it is never
        // logged or serialized alongside the rest of the config tree.
    }

    /// The symmetric key bytes for `SecretString`, decoded from base64, or
    /// `None` when absent (falls back to the reversible encoding).
    pub fn encryption_key_bytes(&self) -> Option<Vec<u8>> {
        let key = self.secrets.encryption_key.as_ref()?;
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, key).ok()
    }
}

/// Abstraction over environment variable lookup so config loading is
/// testable without mutating the real process environment.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
