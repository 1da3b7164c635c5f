// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw HCL shapes. `service "name" { ... }` blocks deserialize straight into
//! an `IndexMap<String, RawService>` keyed by the block label (insertion
//! order preserved, for deterministic compile diagnostics); nested blocks
//! like `retry { ... }` deserialize as plain nested structs.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFile {
    #[serde(default, rename = "workflow")]
    pub workflows: IndexMap<String, RawWorkflow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWorkflow {
    #[serde(default, rename = "service")]
    pub services: IndexMap<String, RawService>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawService {
    /// Name of another `workflow` block this service substitutes for — when
    /// set, every other field on this descriptor is ignored and the named
    /// graph is embedded in place.
    #[serde(default)]
    pub workflow: Option<String>,

    #[serde(default)]
    pub shared: bool,
    /// Marks this as a `ConnectionService`: the driver holds one device
    /// connection open across the service's retries instead of reconnecting
    /// per attempt. Ignored when `workflow` is set.
    #[serde(default)]
    pub connection: bool,
    #[serde(default)]
    pub run_method: Option<String>,
    #[serde(default)]
    pub multiprocessing: bool,
    #[serde(default)]
    pub max_processes: Option<u32>,
    #[serde(default)]
    pub maximum_runs: Option<u32>,
    #[serde(default)]
    pub priority: Option<u32>,

    #[serde(default)]
    pub retry: Option<RawRetry>,
    #[serde(default)]
    pub skip: Option<RawSkip>,
    #[serde(default)]
    pub iteration: Option<RawIteration>,
    #[serde(default)]
    pub validation: Option<RawValidation>,
    #[serde(default)]
    pub preprocessing: Option<String>,
    #[serde(default)]
    pub postprocessing: Option<String>,
    #[serde(default)]
    pub postprocessing_mode: Option<String>,
    #[serde(default)]
    pub notification: Option<RawNotification>,

    /// Scoped names (within this workflow) to take a `success` edge to.
    #[serde(default)]
    pub on_success: Vec<String>,
    /// Scoped names (within this workflow) to take a `failure` edge to.
    #[serde(default)]
    pub on_failure: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRetry {
    #[serde(default)]
    pub number_of_retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub time_between_retries: u64,
    #[serde(default = "default_max_retries")]
    pub max_number_of_retries: u32,
}

fn default_retry_backoff() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    100
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSkip {
    #[serde(default)]
    pub per_workflow: HashMap<String, bool>,
    #[serde(default)]
    pub skip_query: Option<String>,
    #[serde(default)]
    pub skip_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIteration {
    #[serde(default)]
    pub values: Option<String>,
    #[serde(default)]
    pub variable_name: Option<String>,
    #[serde(default)]
    pub devices: Option<String>,
    #[serde(default)]
    pub devices_property: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawValidation {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub validation_section: Option<String>,
    #[serde(default)]
    pub content_match: Option<String>,
    #[serde(default)]
    pub content_match_regex: bool,
    #[serde(default)]
    pub negative_logic: bool,
    #[serde(default)]
    pub delete_spaces_before_matching: bool,
    #[serde(default)]
    pub dict_match: Option<serde_json::Value>,
    #[serde(default)]
    pub conversion_method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNotification {
    #[serde(default)]
    pub send_notification: bool,
    #[serde(default)]
    pub notification_header: Option<String>,
    #[serde(default)]
    pub notification_link: Option<String>,
}
