// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::descriptor::RawFile;
use wfe_core::{EdgeSubtype, RunMethod};

fn parse(hcl: &str) -> IndexMap<String, RawWorkflow> {
    let raw: RawFile = hcl::from_str(hcl).expect("valid hcl fixture");
    raw.workflows
}

#[test]
fn linear_workflow_compiles_start_and_end_plus_edges() {
    let raw = parse(
        r#"
        workflow "linear" {
          service "A" {
            on_success = ["B"]
          }
          service "B" {
            on_success = ["End"]
          }
        }
        "#,
    );
    let compiled = compile_workflows(&raw).unwrap();
    let graph = &compiled["linear"];
    assert_eq!(graph.services.len(), 4); // Start, End, A, B
    assert!(graph.validate_invariants().is_ok());

    let a = graph.services.iter().find(|s| s.scoped_name == "A").unwrap();
    let b = graph.services.iter().find(|s| s.scoped_name == "B").unwrap();
    let to_b = graph.neighbors(a.id, wfe_core::Direction::Destination, EdgeSubtype::Success);
    assert_eq!(to_b[0].0.id, b.id);
    let to_end = graph.neighbors(b.id, wfe_core::Direction::Destination, EdgeSubtype::Success);
    assert!(to_end[0].0.is_end());
}

#[test]
fn unknown_edge_target_is_rejected() {
    let raw = parse(
        r#"
        workflow "w" {
          service "A" {
            on_success = ["Nonexistent"]
          }
        }
        "#,
    );
    let err = compile_workflows(&raw).unwrap_err();
    assert!(matches!(err, RunbookError::UnknownService { .. }));
}

#[test]
fn reserved_scoped_name_redefinition_is_rejected() {
    let raw = parse(
        r#"
        workflow "w" {
          service "Start" {}
        }
        "#,
    );
    let err = compile_workflows(&raw).unwrap_err();
    assert!(matches!(err, RunbookError::InvalidGraph(_)));
}

#[test]
fn invalid_run_method_string_is_rejected() {
    let raw = parse(
        r#"
        workflow "w" {
          service "A" {
            run_method = "sideways"
          }
        }
        "#,
    );
    let err = compile_workflows(&raw).unwrap_err();
    assert!(matches!(err, RunbookError::InvalidEnumValue { field, .. } if field == "run_method"));
}

#[test]
fn nested_workflow_reference_embeds_subgraph() {
    let raw = parse(
        r#"
        workflow "inner" {
          service "X" {}
        }
        workflow "outer" {
          service "Sub" {
            workflow = "inner"
            run_method = "per_service_with_workflow_targets"
          }
        }
        "#,
    );
    let compiled = compile_workflows(&raw).unwrap();
    let outer = &compiled["outer"];
    let sub = outer.services.iter().find(|s| s.scoped_name == "Sub").unwrap();
    assert_eq!(sub.run_method, RunMethod::PerServiceWithWorkflowTargets);
    let inner = sub.as_workflow().expect("Sub embeds a workflow");
    assert!(inner.services.iter().any(|s| s.scoped_name == "X"));
}

#[test]
fn self_referential_workflow_is_a_cycle() {
    let raw = parse(
        r#"
        workflow "w" {
          service "Loop" {
            workflow = "w"
          }
        }
        "#,
    );
    let err = compile_workflows(&raw).unwrap_err();
    assert!(matches!(err, RunbookError::Cycle(_)));
}

#[test]
fn reference_to_undefined_workflow_is_reported() {
    let raw = parse(
        r#"
        workflow "w" {
          service "Sub" {
            workflow = "does_not_exist"
          }
        }
        "#,
    );
    let err = compile_workflows(&raw).unwrap_err();
    assert!(matches!(err, RunbookError::UnknownWorkflowReference { target, .. } if target == "does_not_exist"));
}

#[test]
fn defaults_are_applied_when_fields_are_absent() {
    let raw = parse(
        r#"
        workflow "w" {
          service "A" {}
        }
        "#,
    );
    let compiled = compile_workflows(&raw).unwrap();
    let a = compiled["w"].services.iter().find(|s| s.scoped_name == "A").unwrap();
    assert_eq!(a.maximum_runs, 1);
    assert_eq!(a.priority, 1);
    assert_eq!(a.max_processes, 1);
    assert_eq!(a.run_method, RunMethod::PerDevice);
    assert_eq!(a.retry.number_of_retries, 0);
}
