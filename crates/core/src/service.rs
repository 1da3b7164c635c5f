// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service descriptor and the workflow graph it can carry.
//!
//! Rather than single-table inheritance across `Service`, `ConnectionService`,
//! and `Workflow`, this is a tagged variant: a base [`Service`] record plus a
//! [`ServiceKind`] carrying kind-specific fields, dispatched on kind.

use crate::edge::{Edge, EdgeSubtype};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Identifies a [`Service`] (atomic, connection, or workflow) within a run.
    pub struct ServiceId("svc-");
}

/// Reserved scoped names every workflow graph must contain exactly one of.
pub const START_SCOPED_NAME: &str = "Start";
pub const END_SCOPED_NAME: &str = "End";
/// Reserved scoped name substituted at run time by `Run::placeholder`.
pub const PLACEHOLDER_SCOPED_NAME: &str = "Placeholder";

/// How a service fans its execution across the run's target devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMethod {
    /// The engine runs once per device; exactly one edge subtype is taken
    /// per device based on that device's outcome ("non-BFS mode").
    PerDevice,
    /// BFS mode: device sets propagate along edges; both edge types may be
    /// taken simultaneously for different device subsets. Targets default
    /// to the containing workflow's inbound device set.
    PerServiceWithWorkflowTargets,
    /// BFS mode, but targets are the specific device subset forwarded along
    /// the edge that activated this service, not the whole workflow's set.
    PerServiceWithServiceTargets,
}

impl RunMethod {
    /// True for either BFS mode.
    pub fn is_bfs(self) -> bool {
        matches!(self, RunMethod::PerServiceWithWorkflowTargets | RunMethod::PerServiceWithServiceTargets)
    }
}

/// Retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub number_of_retries: u32,
    pub time_between_retries_secs: u64,
    pub max_number_of_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { number_of_retries: 0, time_between_retries_secs: 10, max_number_of_retries: 100 }
    }
}

impl RetryPolicy {
    /// Number of attempts for one device: retries, capped, plus the initial try.
    pub fn attempts(&self) -> u32 {
        self.number_of_retries.min(self.max_number_of_retries) + 1
    }
}

/// Outcome bucket a skipped service resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipValue {
    Success,
    Failure,
}

impl SkipValue {
    pub fn as_success(self) -> bool {
        matches!(self, SkipValue::Success)
    }
}

/// Skip rule: per-workflow boolean overrides plus an expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkipRule {
    #[serde(default)]
    pub per_workflow: HashMap<String, bool>,
    #[serde(default)]
    pub skip_query: Option<String>,
    #[serde(default = "default_skip_value")]
    pub skip_value: Option<SkipValue>,
}

fn default_skip_value() -> Option<SkipValue> {
    Some(SkipValue::Success)
}

impl SkipRule {
    pub fn is_forced_for(&self, workflow_name: &str) -> bool {
        self.per_workflow.get(workflow_name).copied().unwrap_or(false)
    }
}

/// Iteration configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    /// Expression producing a finite sequence to iterate over.
    pub values: Option<String>,
    pub variable_name: Option<String>,
    /// Expression producing a device set that replaces `target_devices`.
    pub devices: Option<String>,
    pub devices_property: Option<String>,
}

impl Iteration {
    pub fn is_active(&self) -> bool {
        self.values.is_some()
    }

    pub fn has_device_override(&self) -> bool {
        self.devices.is_some()
    }
}

/// What validation compares the extracted result against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationCondition {
    None,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMethod {
    Text,
    Dict,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default = "default_validation_condition")]
    pub condition: Option<ValidationCondition>,
    pub method: Option<ValidationMethod>,
    /// Expression selecting the sub-value of the device result to validate.
    pub validation_section: Option<String>,
    pub content_match: Option<String>,
    #[serde(default)]
    pub content_match_regex: bool,
    #[serde(default)]
    pub negative_logic: bool,
    #[serde(default)]
    pub delete_spaces_before_matching: bool,
    pub dict_match: Option<serde_json::Value>,
    pub conversion_method: Option<String>,
}

fn default_validation_condition() -> Option<ValidationCondition> {
    Some(ValidationCondition::None)
}

impl Validation {
    pub fn is_active(&self) -> bool {
        !matches!(self.condition, None | Some(ValidationCondition::None))
    }
}

/// When postprocessing runs relative to the raw outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostprocessingMode {
    Success,
    Failure,
    Always,
}

impl PostprocessingMode {
    pub fn matches(self, success: bool) -> bool {
        match self {
            PostprocessingMode::Always => true,
            PostprocessingMode::Success => success,
            PostprocessingMode::Failure => !success,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrePost {
    pub preprocessing: Option<String>,
    pub postprocessing: Option<String>,
    #[serde(default = "default_postprocessing_mode")]
    pub postprocessing_mode: PostprocessingMode,
}

fn default_postprocessing_mode() -> PostprocessingMode {
    PostprocessingMode::Success
}

impl Default for PostprocessingMode {
    fn default() -> Self {
        PostprocessingMode::Success
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub send_notification: bool,
    pub notification_header: Option<String>,
    pub notification_link: Option<String>,
}

/// Kind-specific payload, dispatched on by the Runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServiceKind {
    /// A plain automation unit with no sub-graph.
    Atomic,
    /// A service that owns a persistent device connection across retries.
    /// No extra fields are needed at this layer — the distinction only
    /// matters to the leaf driver.
    Connection,
    /// A workflow: a sub-graph of member services and edges.
    Workflow(Box<WorkflowGraph>),
}

/// A service: the indivisible automation node, or (when `kind` is
/// `Workflow`) the container for a sub-graph of other services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub scoped_name: String,
    /// When true, the fully-qualified name is `"[Shared] <scoped_name>"`
    /// regardless of the containing workflow.
    pub shared: bool,
    pub retry: RetryPolicy,
    pub skip: SkipRule,
    pub run_method: RunMethod,
    pub multiprocessing: bool,
    pub max_processes: u32,
    /// Cap on re-entries within one workflow execution (default 1).
    pub maximum_runs: u32,
    /// Higher runs earlier; queue key is `1/priority`. 0 is illegal and is
    /// coerced to 1 by [`Service::priority_or_coerced`].
    pub priority: u32,
    pub iteration: Iteration,
    pub validation: Validation,
    pub pre_post: PrePost,
    pub notification: Notification,
    pub kind: ServiceKind,
}

impl Service {
    /// Construct a reserved `Start`/`End`/`Placeholder` marker service:
    /// minimal fields, atomic kind, priority 1, no retries.
    fn reserved(scoped_name: &str) -> Self {
        Self {
            id: ServiceId::new(),
            scoped_name: scoped_name.to_string(),
            shared: false,
            retry: RetryPolicy::default(),
            skip: SkipRule::default(),
            run_method: RunMethod::PerDevice,
            multiprocessing: false,
            max_processes: 1,
            maximum_runs: 1,
            priority: 1,
            iteration: Iteration::default(),
            validation: Validation::default(),
            pre_post: PrePost::default(),
            notification: Notification::default(),
            kind: ServiceKind::Atomic,
        }
    }

    pub fn start() -> Self {
        Self::reserved(START_SCOPED_NAME)
    }

    pub fn end() -> Self {
        Self::reserved(END_SCOPED_NAME)
    }

    pub fn is_start(&self) -> bool {
        self.scoped_name == START_SCOPED_NAME
    }

    pub fn is_end(&self) -> bool {
        self.scoped_name == END_SCOPED_NAME
    }

    pub fn is_placeholder(&self) -> bool {
        self.scoped_name == PLACEHOLDER_SCOPED_NAME
    }

    pub fn is_workflow(&self) -> bool {
        matches!(self.kind, ServiceKind::Workflow(_))
    }

    pub fn as_workflow(&self) -> Option<&WorkflowGraph> {
        match &self.kind {
            ServiceKind::Workflow(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_workflow_mut(&mut self) -> Option<&mut WorkflowGraph> {
        match &mut self.kind {
            ServiceKind::Workflow(w) => Some(w),
            _ => None,
        }
    }

    /// Fully-qualified name: `"[<workflow>] <scoped_name>"`, or
    /// `"[Shared] <scoped_name>"` when `shared` is set.
    pub fn qualified_name(&self, containing_workflow_name: &str) -> String {
        if self.shared {
            format!("[Shared] {}", self.scoped_name)
        } else {
            format!("[{}] {}", containing_workflow_name, self.scoped_name)
        }
    }

    /// `priority`, coerced to at least 1: `priority=0` is illegal, and the
    /// queue key is `1/priority`, which would divide by zero.
    pub fn priority_or_coerced(&self) -> u32 {
        self.priority.max(1)
    }
}

crate::builder! {
    pub struct ServiceBuilder => Service {
        into {
            scoped_name: String = "service",
        }
        set {
            id: ServiceId = ServiceId::new(),
            shared: bool = false,
            retry: RetryPolicy = RetryPolicy::default(),
            skip: SkipRule = SkipRule::default(),
            run_method: RunMethod = RunMethod::PerDevice,
            multiprocessing: bool = false,
            max_processes: u32 = 1,
            maximum_runs: u32 = 1,
            priority: u32 = 1,
            iteration: Iteration = Iteration::default(),
            validation: Validation = Validation::default(),
            pre_post: PrePost = PrePost::default(),
            notification: Notification = Notification::default(),
            kind: ServiceKind = ServiceKind::Atomic,
        }
    }
}

/// A workflow's sub-graph: member services held in an arena (`Vec`) and
/// edges referencing them by [`ServiceId`], so cyclic references between
/// services never need `Rc`/`RefCell`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub name: String,
    pub services: Vec<Service>,
    pub edges: Vec<Edge>,
}

/// Direction argument to [`WorkflowGraph::neighbors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Predecessors: services with an edge whose *destination* is the
    /// queried service. The peer returned is each edge's `source`.
    Source,
    /// Successors: services with an edge whose *source* is the queried
    /// service. The peer returned is each edge's `destination`.
    Destination,
}

impl WorkflowGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), services: vec![Service::start(), Service::end()], edges: Vec::new() }
    }

    pub fn find(&self, id: ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn find_mut(&mut self, id: ServiceId) -> Option<&mut Service> {
        self.services.iter_mut().find(|s| s.id == id)
    }

    /// `None` only if this graph skipped [`Self::validate_invariants`] and
    /// has no `Start` service.
    pub fn start(&self) -> Option<&Service> {
        self.services.iter().find(|s| s.is_start())
    }

    /// `None` only if this graph skipped [`Self::validate_invariants`] and
    /// has no `End` service.
    pub fn end(&self) -> Option<&Service> {
        self.services.iter().find(|s| s.is_end())
    }

    /// Checks the invariant that exactly one `Start` and one `End` service
    /// exist. Returns the violation message on failure.
    pub fn validate_invariants(&self) -> Result<(), String> {
        let starts = self.services.iter().filter(|s| s.is_start()).count();
        let ends = self.services.iter().filter(|s| s.is_end()).count();
        if starts != 1 {
            return Err(format!("workflow {:?} must have exactly one Start service, found {starts}", self.name));
        }
        if ends != 1 {
            return Err(format!("workflow {:?} must have exactly one End service, found {ends}", self.name));
        }
        let mut seen = std::collections::HashSet::new();
        for edge in &self.edges {
            let key = (edge.subtype, edge.source, edge.destination);
            if !seen.insert(key) {
                return Err(format!("duplicate edge {:?} -> {:?} ({:?}) in workflow {:?}", edge.source, edge.destination, edge.subtype, self.name));
            }
        }
        Ok(())
    }

    /// Neighbors of `service_id` along edges of the given `subtype`, in the
    /// given [`Direction`]. See [`Direction`] for the exact semantics.
    pub fn neighbors(&self, service_id: ServiceId, direction: Direction, subtype: EdgeSubtype) -> Vec<(&Service, &Edge)> {
        self.edges
            .iter()
            .filter(|e| e.subtype == subtype)
            .filter_map(|e| match direction {
                Direction::Destination if e.source == service_id => {
                    self.find(e.destination).map(|s| (s, e))
                }
                Direction::Source if e.destination == service_id => {
                    self.find(e.source).map(|s| (s, e))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
