// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per (run, service, device) outcome record.

use crate::device::DeviceId;
use crate::run::Runtime;
use crate::service::ServiceId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies one [`ExecutionResult`] record.
    pub struct ResultId("res-");
}

/// One recorded outcome: a per-device attempt, or the aggregate across a
/// service's devices when `device` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: ResultId,
    pub runtime: Runtime,
    pub service: ServiceId,
    pub device: Option<DeviceId>,
    pub success: bool,
    pub result: serde_json::Value,
    pub duration_ms: u64,
    /// The aggregate result this record rolls up into, if any.
    pub parent: Option<ResultId>,
}

impl ExecutionResult {
    pub fn aggregate(runtime: Runtime, service: ServiceId, success: bool, result: serde_json::Value, duration_ms: u64) -> Self {
        Self { id: ResultId::new(), runtime, service, device: None, success, result, duration_ms, parent: None }
    }

    pub fn per_device(
        runtime: Runtime,
        service: ServiceId,
        device: DeviceId,
        success: bool,
        result: serde_json::Value,
        duration_ms: u64,
        parent: ResultId,
    ) -> Self {
        Self { id: ResultId::new(), runtime, service, device: Some(device), success, result, duration_ms, parent: Some(parent) }
    }
}
