// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::device::{Device, DeviceId, DeviceSet};
use crate::edge::{Edge, EdgeSubtype};
use crate::service::{Service, ServiceKind, WorkflowGraph};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core domain enums.
pub mod strategies {
    use crate::run::{RunStatus, Trigger};
    use crate::service::RunMethod;
    use proptest::prelude::*;

    pub fn arb_run_status() -> impl Strategy<Value = RunStatus> {
        prop_oneof![
            Just(RunStatus::Running),
            Just(RunStatus::Idle),
            Just(RunStatus::Aborted),
            Just(RunStatus::Completed),
        ]
    }

    pub fn arb_trigger() -> impl Strategy<Value = Trigger> {
        prop_oneof![Just(Trigger::Ui), Just(Trigger::Scheduler), Just(Trigger::Rest)]
    }

    pub fn arb_run_method() -> impl Strategy<Value = RunMethod> {
        prop_oneof![
            Just(RunMethod::PerDevice),
            Just(RunMethod::PerServiceWithWorkflowTargets),
            Just(RunMethod::PerServiceWithServiceTargets),
        ]
    }
}

// ── Device factory functions ────────────────────────────────────────────

pub fn device(name: &str) -> Device {
    Device::new(DeviceId::new(), name)
}

pub fn device_set(names: &[&str]) -> DeviceSet {
    names.iter().map(|&n| device(n)).collect()
}

// ── Workflow graph factory functions ────────────────────────────────────

/// A workflow with one atomic service wired `Start -success-> service -success-> End`.
pub fn single_service_workflow(workflow_name: &str, service_name: &str) -> WorkflowGraph {
    let mut wf = WorkflowGraph::new(workflow_name);
    let svc = Service::builder().scoped_name(service_name).build();
    // `WorkflowGraph::new` just seeded `services` with exactly `[Start, End]`.
    let start = wf.services[0].id;
    let end = wf.services[1].id;
    wf.edges.push(Edge::new(start, svc.id, EdgeSubtype::Success));
    wf.edges.push(Edge::new(svc.id, end, EdgeSubtype::Success));
    wf.services.push(svc);
    wf
}

/// Wraps `inner` as a nested workflow service inside `outer`, wired from
/// `outer`'s Start to its End on success.
pub fn nest_workflow(outer_name: &str, inner: WorkflowGraph) -> WorkflowGraph {
    let mut outer = WorkflowGraph::new(outer_name);
    let nested_name = inner.name.clone();
    let svc = Service::builder().scoped_name(nested_name).kind(ServiceKind::Workflow(Box::new(inner))).build();
    // `WorkflowGraph::new` just seeded `services` with exactly `[Start, End]`.
    let start = outer.services[0].id;
    let end = outer.services[1].id;
    outer.edges.push(Edge::new(start, svc.id, EdgeSubtype::Success));
    outer.edges.push(Edge::new(svc.id, end, EdgeSubtype::Success));
    outer.services.push(svc);
    outer
}
