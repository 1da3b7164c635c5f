// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical state tree path helpers for the run state tree vocabulary.

use wfe_core::{EdgeId, ServiceId};

pub fn progress_service_success() -> String {
    "progress/service/success".to_string()
}

pub fn progress_service_failure() -> String {
    "progress/service/failure".to_string()
}

pub fn progress_service_device(service: ServiceId, bucket: &str) -> String {
    format!("progress/service/{service}/device/{bucket}")
}

pub fn edge(edge_id: EdgeId) -> String {
    format!("edges/{edge_id}")
}

/// Per-service device progress counters, addressable independent of the
/// service's position in a particular run's progress tree.
pub fn service_progress_device(service: ServiceId, bucket: &str) -> String {
    format!("{service}/progress/device/{bucket}")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
