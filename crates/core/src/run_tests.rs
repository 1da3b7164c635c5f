// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::service::ServiceId;

#[test]
fn runtime_formats_epoch_and_sequence_sortably() {
    let a = Runtime::new(1_732_650_000_000, 3);
    let b = Runtime::new(1_732_650_000_000, 4);
    assert_eq!(a.as_str(), "1732650000000-000003");
    assert!(a < b);
}

#[test]
fn top_level_run_is_its_own_parent_runtime() {
    let runtime = Runtime::from_string("r1");
    let run = Run::top_level(runtime.clone(), ServiceId::new(), Trigger::Ui);
    assert_eq!(run.parent_runtime, runtime);
    assert!(run.parent.is_none());
    assert_eq!(run.status, RunStatus::Running);
}

#[test]
fn child_run_inherits_parent_runtime_and_targets() {
    let parent_runtime = Runtime::from_string("parent");
    let mut parent = Run::top_level(parent_runtime.clone(), ServiceId::new(), Trigger::Scheduler);
    parent.target_devices = vec![DeviceId::new()];

    let child_runtime = Runtime::from_string("child");
    let child = Run::child(child_runtime.clone(), &parent, ServiceId::new());

    assert_eq!(child.parent_runtime, parent_runtime);
    assert_eq!(child.parent, Some(parent.runtime.clone()));
    assert_eq!(child.target_devices, parent.target_devices);
    assert_eq!(child.trigger, parent.trigger);
}

#[test]
fn is_terminal_true_only_for_aborted_or_completed() {
    let mut run = Run::top_level(Runtime::from_string("r1"), ServiceId::new(), Trigger::Rest);
    assert!(!run.is_terminal());
    run.status = RunStatus::Idle;
    assert!(!run.is_terminal());
    run.status = RunStatus::Completed;
    assert!(run.is_terminal());
    run.status = RunStatus::Aborted;
    assert!(run.is_terminal());
}

#[test]
fn outcome_new_starts_with_null_result_and_empty_summary() {
    let outcome = Outcome::new(true, serde_json::json!({"k": "v"}));
    assert!(outcome.success);
    assert!(outcome.result.is_null());
    assert!(outcome.summary.success.is_empty());
    assert!(outcome.summary.failure.is_empty());
}

#[test]
fn run_builder_fills_in_matching_parent_and_test_runtime_defaults() {
    let run = Run::builder().build();
    assert_eq!(run.runtime, run.parent_runtime);
    assert!(run.parent.is_none());
}
