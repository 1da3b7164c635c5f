// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A [`Run`] is one execution of a top-level service. Its [`Runtime`] is a
//! monotonic timestamp string, not a random id, so it gets its own newtype
//! rather than [`crate::define_id!`].

use crate::device::DeviceId;
use crate::result::ExecutionResult;
use crate::service::ServiceId;
use serde::{Deserialize, Serialize};

/// Primary key of a [`Run`]: a collision-free, lexicographically sortable
/// timestamp string assigned by the Run Controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Runtime(String);

impl Runtime {
    /// Construct from an already-formatted string (parsing / tests).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Format `epoch_ms` plus a disambiguating sequence number into a
    /// sortable runtime id, e.g. `"1732650000000-000003"`.
    pub fn new(epoch_ms: u64, seq: u64) -> Self {
        Self(format!("{epoch_ms:013}-{seq:06}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a run was initiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Ui,
    Scheduler,
    Rest,
}

/// Lifecycle state of a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Idle,
    Aborted,
    Completed,
}

/// Aggregate summary device buckets, produced by the engine's termination
/// rules and the Runner's per-service aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub success: Vec<DeviceId>,
    pub failure: Vec<DeviceId>,
}

/// The outcome a run (or a single service invocation within it) finalizes
/// with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub result: serde_json::Value,
    #[serde(default)]
    pub summary: DeviceSummary,
    pub payload: serde_json::Value,
}

impl Outcome {
    pub fn new(success: bool, payload: serde_json::Value) -> Self {
        Self { success, result: serde_json::Value::Null, summary: DeviceSummary::default(), payload }
    }
}

/// One execution of a top-level service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub runtime: Runtime,
    pub service: ServiceId,
    pub parent: Option<Runtime>,
    /// Shared by this run and all of its children.
    pub parent_runtime: Runtime,
    pub restart_run: Option<Runtime>,
    pub placeholder: Option<ServiceId>,
    pub payload: serde_json::Value,
    pub target_devices: Vec<DeviceId>,
    pub target_pools: Vec<String>,
    pub start_services: Vec<ServiceId>,
    pub properties: serde_json::Value,
    pub trigger: Trigger,
    pub success: Option<bool>,
    pub status: RunStatus,
    pub results: Option<ExecutionResult>,
    /// Progress tree, set once at finalization from the live state store.
    pub state: Option<serde_json::Value>,
}

impl Run {
    /// A fresh top-level run (its own `parent_runtime`).
    pub fn top_level(runtime: Runtime, service: ServiceId, trigger: Trigger) -> Self {
        Self {
            parent_runtime: runtime.clone(),
            runtime,
            service,
            parent: None,
            restart_run: None,
            placeholder: None,
            payload: serde_json::json!({}),
            target_devices: Vec::new(),
            target_pools: Vec::new(),
            start_services: Vec::new(),
            properties: serde_json::json!({}),
            trigger,
            success: None,
            status: RunStatus::Running,
            results: None,
            state: None,
        }
    }

    /// A child run invoked by a parent's Runner, inheriting `parent_runtime`
    /// and the `stop` flag lineage.
    pub fn child(runtime: Runtime, parent: &Run, service: ServiceId) -> Self {
        Self {
            parent_runtime: parent.parent_runtime.clone(),
            runtime,
            service,
            parent: Some(parent.runtime.clone()),
            restart_run: None,
            placeholder: parent.placeholder,
            payload: parent.payload.clone(),
            target_devices: parent.target_devices.clone(),
            target_pools: parent.target_pools.clone(),
            start_services: Vec::new(),
            properties: parent.properties.clone(),
            trigger: parent.trigger,
            success: None,
            status: RunStatus::Running,
            results: None,
            state: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, RunStatus::Aborted | RunStatus::Completed)
    }
}

crate::builder! {
    pub struct RunBuilder => Run {
        set {
            runtime: Runtime = Runtime::from_string("test-runtime"),
            parent_runtime: Runtime = Runtime::from_string("test-runtime"),
            service: ServiceId = ServiceId::new(),
            target_devices: Vec<DeviceId> = Vec::new(),
            target_pools: Vec<String> = Vec::new(),
            start_services: Vec<ServiceId> = Vec::new(),
            trigger: Trigger = Trigger::Ui,
            success: Option<bool> = None,
            status: RunStatus = RunStatus::Running,
            payload: serde_json::Value = serde_json::json!({}),
            properties: serde_json::Value = serde_json::json!({}),
        }
        option {
            parent: Runtime = None,
            restart_run: Runtime = None,
            placeholder: ServiceId = None,
            state: serde_json::Value = None,
        }
        computed {
            results: Option<ExecutionResult> = None,
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
