// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::Runner;
use crate::sleeper::InstantSleeper;
use serde_json::json;
use std::sync::Arc;
use wfe_adapters::{FakeDeviceDriver, FakeNotifyAdapter};
use wfe_core::test_support::device_set;
use wfe_core::{Edge, FakeClock, Run, RunRegistry, Service, ServiceKind};
use wfe_storage::LocalStore;

fn runner(driver: FakeDeviceDriver) -> Runner<FakeClock> {
    Runner::new(
        Arc::new(driver),
        Arc::new(FakeNotifyAdapter::new()),
        Arc::new(LocalStore::new()),
        Arc::new(InstantSleeper::new()),
        RunRegistry::new(),
        FakeClock::new(),
    )
}

/// A `PerDevice` (non-BFS) run needs its permitted device set registered
/// under its own runtime ahead of time: the Runner's `resolve_targets` falls
/// back to `RunRegistry::targets(&run.parent_runtime)` whenever the caller
/// forwards no explicit target set, which is exactly what the workflow
/// engine does for every non-BFS dispatch. In production this registration
/// happens inside `Runner::invoke_workflow`; tests that call
/// `workflow_engine::run` directly must do it themselves.
fn run_with_targets(runner: &Runner<FakeClock>, devices: wfe_core::DeviceSet) -> Run {
    let run = Run::builder().build();
    runner.registry().register(run.runtime.clone(), devices, None);
    run
}

#[tokio::test]
async fn per_device_mode_walks_start_to_end_on_success() {
    let driver = FakeDeviceDriver::new();
    let runner = runner(driver.clone());
    let workflow = wfe_core::test_support::single_service_workflow("rollout", "configure");
    let run = run_with_targets(&runner, device_set(&["r1"]));
    let start_id = workflow.start().unwrap().id;

    let outcome = workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerDevice,
            start_services: std::slice::from_ref(&start_id),
            start_targets: device_set(&["r1"]),
            payload: json!({}),
        },
    )
    .await;

    assert!(outcome.success);
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn per_device_mode_takes_failure_edge_and_never_reaches_end() {
    let driver = FakeDeviceDriver::always_fail("nope");
    let runner = runner(driver.clone());
    let mut workflow = wfe_core::WorkflowGraph::new("rollout");
    let svc = Service::builder().scoped_name("configure").build();
    let start = workflow.start().unwrap().id;
    let end = workflow.end().unwrap().id;
    workflow.edges.push(Edge::new(start, svc.id, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(svc.id, end, wfe_core::EdgeSubtype::Success));
    workflow.services.push(svc.clone());
    let run = run_with_targets(&runner, device_set(&["r1"]));

    let outcome = workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerDevice,
            start_services: std::slice::from_ref(&start),
            start_targets: device_set(&["r1"]),
            payload: json!({}),
        },
    )
    .await;

    // No failure edge out of `configure`, so End is never visited.
    assert!(!outcome.success);
}

#[tokio::test]
async fn bfs_mode_propagates_only_devices_that_succeeded() {
    let driver = FakeDeviceDriver::new();
    driver.push_error("bad", wfe_adapters::DriverError::Permanent("down".into()));
    let runner = runner(driver.clone());
    let workflow = wfe_core::test_support::single_service_workflow("rollout", "configure");
    let run = Run::builder().build();
    let start_id = workflow.start().unwrap().id;

    let outcome = workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerServiceWithWorkflowTargets,
            start_services: std::slice::from_ref(&start_id),
            start_targets: device_set(&["good", "bad"]),
            payload: json!({}),
        },
    )
    .await;

    assert!(!outcome.success);
    assert_eq!(outcome.summary.success.len(), 1);
    assert_eq!(outcome.summary.failure.len(), 1);
}

#[tokio::test]
async fn bfs_mode_preserves_device_identity_through_propagation() {
    let driver = FakeDeviceDriver::new();
    let runner = runner(driver.clone());
    let workflow = wfe_core::test_support::single_service_workflow("rollout", "configure");
    let run = Run::builder().build();
    let start_id = workflow.start().unwrap().id;
    let device = wfe_core::Device::new(wfe_core::DeviceId::new(), "edge-1").property("site", "nyc");
    let targets = wfe_core::DeviceSet::from_devices([device.clone()]);

    workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerServiceWithWorkflowTargets,
            start_services: std::slice::from_ref(&start_id),
            start_targets: targets,
            payload: json!({}),
        },
    )
    .await;

    assert_eq!(driver.calls()[0].device_name, "edge-1");
}

#[tokio::test]
async fn maximum_runs_caps_re_entry_of_the_same_service() {
    let driver = FakeDeviceDriver::new();
    let runner = runner(driver.clone());
    let mut workflow = wfe_core::WorkflowGraph::new("loop");
    let svc = Service::builder().scoped_name("poll").maximum_runs(1).build();
    let start = workflow.start().unwrap().id;
    let end = workflow.end().unwrap().id;
    // A self-loop on success, plus the normal path to End, so the engine
    // would spin on `poll` forever without the `maximum_runs` cap.
    workflow.edges.push(Edge::new(start, svc.id, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(svc.id, svc.id, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(svc.id, end, wfe_core::EdgeSubtype::Success));
    workflow.services.push(svc.clone());
    let run = run_with_targets(&runner, device_set(&["r1"]));

    workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerDevice,
            start_services: std::slice::from_ref(&start),
            start_targets: device_set(&["r1"]),
            payload: json!({}),
        },
    )
    .await;

    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn forced_skip_bypasses_service_but_still_propagates() {
    let driver = FakeDeviceDriver::always_fail("should not run");
    let runner = runner(driver.clone());
    let mut workflow = wfe_core::WorkflowGraph::new("maintenance");
    let mut skip = wfe_core::SkipRule::default();
    skip.per_workflow.insert("maintenance".into(), true);
    let svc = Service::builder().scoped_name("configure").skip(skip).build();
    let start = workflow.start().unwrap().id;
    let end = workflow.end().unwrap().id;
    workflow.edges.push(Edge::new(start, svc.id, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(svc.id, end, wfe_core::EdgeSubtype::Success));
    workflow.services.push(svc);
    let run = run_with_targets(&runner, device_set(&["r1"]));

    let outcome = workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerDevice,
            start_services: std::slice::from_ref(&start),
            start_targets: device_set(&["r1"]),
            payload: json!({}),
        },
    )
    .await;

    assert!(outcome.success);
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn placeholder_service_runs_the_designated_substitute() {
    let driver = FakeDeviceDriver::new();
    let runner = runner(driver.clone());
    let mut workflow = wfe_core::WorkflowGraph::new("rollout");
    let real = Service::builder().scoped_name("configure").build();
    let placeholder = Service::builder().scoped_name(wfe_core::PLACEHOLDER_SCOPED_NAME).build();
    let start = workflow.start().unwrap().id;
    let end = workflow.end().unwrap().id;
    workflow.edges.push(Edge::new(start, placeholder.id, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(placeholder.id, end, wfe_core::EdgeSubtype::Success));
    workflow.services.push(real.clone());
    workflow.services.push(placeholder.clone());
    let mut run = run_with_targets(&runner, device_set(&["r1"]));
    run.placeholder = Some(real.id);

    let outcome = workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerDevice,
            start_services: std::slice::from_ref(&start),
            start_targets: device_set(&["r1"]),
            payload: json!({}),
        },
    )
    .await;

    assert!(outcome.success);
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn priority_breaks_ties_by_running_higher_priority_first() {
    let driver = FakeDeviceDriver::new();
    let runner = runner(driver.clone());
    let mut workflow = wfe_core::WorkflowGraph::new("fanout");
    let low = Service::builder()
        .scoped_name("low")
        .priority(1)
        .pre_post(wfe_core::PrePost { preprocessing: Some(r#"{ svc = "low" }"#.into()), ..wfe_core::PrePost::default() })
        .build();
    let high = Service::builder()
        .scoped_name("high")
        .priority(10)
        .pre_post(wfe_core::PrePost { preprocessing: Some(r#"{ svc = "high" }"#.into()), ..wfe_core::PrePost::default() })
        .build();
    let start = workflow.start().unwrap().id;
    let end = workflow.end().unwrap().id;
    // Both reachable from Start in one hop; queued in `low, high` order so a
    // FIFO-only scheduler would run `low` first.
    workflow.edges.push(Edge::new(start, low.id, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(start, high.id, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(low.id, end, wfe_core::EdgeSubtype::Success));
    workflow.edges.push(Edge::new(high.id, end, wfe_core::EdgeSubtype::Success));
    workflow.services.push(low);
    workflow.services.push(high);
    let run = run_with_targets(&runner, device_set(&["r1"]));

    workflow_engine::run(
        &runner,
        EngineCtx {
            run: &run,
            workflow: &workflow,
            run_method: wfe_core::RunMethod::PerDevice,
            start_services: std::slice::from_ref(&start),
            start_targets: device_set(&["r1"]),
            payload: json!({}),
        },
    )
    .await;

    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].payload, json!({"svc": "high"}));
    assert_eq!(calls[1].payload, json!({"svc": "low"}));
}

#[tokio::test]
async fn nested_workflow_service_is_not_a_counterpart_of_its_outer_graph() {
    // ServiceKind::Workflow is exercised end to end via Runner::invoke in
    // runner_tests.rs; here we only confirm the graph walk treats it as an
    // ordinary dispatchable node (its own `is_workflow` bookkeeping is the
    // Runner's job, not the workflow engine's).
    let mut outer = wfe_core::WorkflowGraph::new("outer");
    let inner = wfe_core::test_support::single_service_workflow("inner", "configure");
    let svc = Service::builder().scoped_name("inner").kind(ServiceKind::Workflow(Box::new(inner))).build();
    assert!(svc.is_workflow());
    outer.services.push(svc);
    assert_eq!(outer.services.len(), 3);
}
