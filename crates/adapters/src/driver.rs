// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box per-device execution. The Runner calls [`DeviceDriver::run`]
//! once per device per attempt; everything about how a device is actually
//! reached (SSH, NETCONF, SNMP, an HTTP API) lives behind this seam and is
//! out of scope here.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use wfe_core::Device;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DriverError {
    /// Worth retrying: a timeout, a reset connection, a 5xx from a device API.
    #[error("transient device error: {0}")]
    Transient(String),
    /// Not worth retrying: bad credentials, a malformed command, a 4xx.
    #[error("permanent device error: {0}")]
    Permanent(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverOutcome {
    pub success: bool,
    pub result: Value,
}

impl DriverOutcome {
    pub fn success(result: Value) -> Self {
        Self { success: true, result }
    }

    pub fn failure(result: Value) -> Self {
        Self { success: false, result }
    }
}

#[async_trait]
pub trait DeviceDriver: Send + Sync {
    async fn run(&self, device: &Device, payload: &Value) -> Result<DriverOutcome, DriverError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{DeviceDriver, DriverError, DriverOutcome};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;
    use wfe_core::Device;

    #[derive(Debug, Clone)]
    pub struct DriverCall {
        pub device_name: String,
        pub payload: Value,
    }

    #[derive(Clone)]
    enum Script {
        Outcome(DriverOutcome),
        Error(DriverError),
    }

    struct FakeState {
        calls: Vec<DriverCall>,
        default: Script,
        per_device: HashMap<String, std::collections::VecDeque<Script>>,
    }

    /// Scriptable [`DeviceDriver`]: defaults to succeeding, but a per-device
    /// queue of outcomes/errors can be pushed to exercise retries and mixed
    /// per-device results.
    #[derive(Clone)]
    pub struct FakeDeviceDriver {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeDeviceDriver {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeState {
                    calls: Vec::new(),
                    default: Script::Outcome(DriverOutcome::success(Value::Null)),
                    per_device: HashMap::new(),
                })),
            }
        }
    }

    impl FakeDeviceDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn always_fail(message: impl Into<String>) -> Self {
            let driver = Self::new();
            driver.inner.lock().default = Script::Outcome(DriverOutcome::failure(Value::String(message.into())));
            driver
        }

        /// Queue the next outcome for `device_name`; calls beyond the queued
        /// set fall back to the driver's default.
        pub fn push_outcome(&self, device_name: impl Into<String>, outcome: DriverOutcome) {
            self.inner.lock().per_device.entry(device_name.into()).or_default().push_back(Script::Outcome(outcome));
        }

        pub fn push_error(&self, device_name: impl Into<String>, error: DriverError) {
            self.inner.lock().per_device.entry(device_name.into()).or_default().push_back(Script::Error(error));
        }

        pub fn calls(&self) -> Vec<DriverCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl DeviceDriver for FakeDeviceDriver {
        async fn run(&self, device: &Device, payload: &Value) -> Result<DriverOutcome, DriverError> {
            let mut state = self.inner.lock();
            state.calls.push(DriverCall { device_name: device.name.clone(), payload: payload.clone() });
            let script = state
                .per_device
                .get_mut(&device.name)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| state.default.clone());
            match script {
                Script::Outcome(outcome) => Ok(outcome),
                Script::Error(error) => Err(error),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{DriverCall, FakeDeviceDriver};

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
