// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lowers the raw HCL shapes in [`crate::descriptor`] into the
//! `wfe_core::WorkflowGraph` arena the engine walks: resolving scoped-name
//! edge references to `ServiceId`s, embedding `workflow = "..."` references
//! as nested `ServiceKind::Workflow` sub-graphs, and validating the Start/End
//! invariant every graph must hold.

use crate::descriptor::{
    RawIteration, RawNotification, RawRetry, RawService, RawSkip, RawValidation, RawWorkflow,
};
use crate::error::RunbookError;
use indexmap::IndexMap;
use std::collections::HashMap;
use wfe_core::{
    Edge, EdgeSubtype, Iteration, Notification, PostprocessingMode, PrePost, RetryPolicy,
    RunMethod, Service, ServiceId, ServiceKind, SkipRule, SkipValue, Validation,
    ValidationCondition, ValidationMethod, WorkflowGraph, END_SCOPED_NAME, START_SCOPED_NAME,
};

/// Compile every workflow block in `raw` into a [`WorkflowGraph`], keyed by
/// workflow name. Workflows are compiled independently of declaration
/// order — a `workflow = "..."` reference compiles its target on demand and
/// memoizes the result, so forward references between blocks work.
pub fn compile_workflows(raw: &IndexMap<String, RawWorkflow>) -> Result<IndexMap<String, WorkflowGraph>, RunbookError> {
    let mut compiled: IndexMap<String, WorkflowGraph> = IndexMap::new();
    let mut stack: Vec<String> = Vec::new();
    for name in raw.keys() {
        compile_one(name, raw, &mut compiled, &mut stack)?;
    }
    Ok(compiled)
}

fn compile_one(
    name: &str,
    raw: &IndexMap<String, RawWorkflow>,
    compiled: &mut IndexMap<String, WorkflowGraph>,
    stack: &mut Vec<String>,
) -> Result<WorkflowGraph, RunbookError> {
    if let Some(done) = compiled.get(name) {
        return Ok(done.clone());
    }
    if stack.iter().any(|s| s == name) {
        return Err(RunbookError::Cycle(name.to_string()));
    }
    let Some(workflow_raw) = raw.get(name) else {
        return Err(RunbookError::UnknownWorkflowReference {
            workflow: stack.last().cloned().unwrap_or_default(),
            service: String::new(),
            target: name.to_string(),
        });
    };

    stack.push(name.to_string());

    let mut graph = WorkflowGraph::new(name);
    let mut name_to_id: HashMap<String, ServiceId> = HashMap::new();
    let start_id = graph.start().ok_or_else(|| RunbookError::InvalidGraph(format!("workflow {name:?} missing Start service")))?.id;
    let end_id = graph.end().ok_or_else(|| RunbookError::InvalidGraph(format!("workflow {name:?} missing End service")))?.id;
    name_to_id.insert(START_SCOPED_NAME.to_string(), start_id);
    name_to_id.insert(END_SCOPED_NAME.to_string(), end_id);

    for scoped_name in workflow_raw.services.keys() {
        if scoped_name == START_SCOPED_NAME || scoped_name == END_SCOPED_NAME {
            return Err(RunbookError::InvalidGraph(format!(
                "workflow {name:?} redefines reserved service {scoped_name:?}"
            )));
        }
    }

    for (scoped_name, raw_service) in &workflow_raw.services {
        let service = build_service(name, scoped_name, raw_service, raw, compiled, stack)?;
        name_to_id.insert(scoped_name.clone(), service.id);
        graph.services.push(service);
    }

    for (scoped_name, raw_service) in &workflow_raw.services {
        let source_id = name_to_id[scoped_name];
        push_edges(&mut graph, name, source_id, &raw_service.on_success, EdgeSubtype::Success, &name_to_id)?;
        push_edges(&mut graph, name, source_id, &raw_service.on_failure, EdgeSubtype::Failure, &name_to_id)?;
    }

    graph.validate_invariants().map_err(RunbookError::InvalidGraph)?;

    stack.pop();
    compiled.insert(name.to_string(), graph.clone());
    Ok(graph)
}

fn push_edges(
    graph: &mut WorkflowGraph,
    workflow: &str,
    source_id: ServiceId,
    targets: &[String],
    subtype: EdgeSubtype,
    name_to_id: &HashMap<String, ServiceId>,
) -> Result<(), RunbookError> {
    for target in targets {
        let Some(&destination_id) = name_to_id.get(target) else {
            return Err(RunbookError::UnknownService { workflow: workflow.to_string(), name: target.clone() });
        };
        graph.edges.push(Edge::new(source_id, destination_id, subtype));
    }
    Ok(())
}

/// Builds one [`Service`] from its raw descriptor. A `workflow = "..."`
/// reference embeds the named graph and ignores every Runner-only field
/// (retry/iteration/validation/pre_post/notification), per the descriptor's
/// documented semantics — only the graph-walk-level fields (run_method,
/// multiprocessing, maximum_runs, priority, skip) still apply.
fn build_service(
    workflow: &str,
    scoped_name: &str,
    raw: &RawService,
    all_raw: &IndexMap<String, RawWorkflow>,
    compiled: &mut IndexMap<String, WorkflowGraph>,
    stack: &mut Vec<String>,
) -> Result<Service, RunbookError> {
    let run_method = parse_run_method(workflow, scoped_name, raw.run_method.as_deref())?;
    let skip = parse_skip(workflow, scoped_name, raw.skip.as_ref())?;
    let max_processes = raw.max_processes.unwrap_or(1).max(1);
    let maximum_runs = raw.maximum_runs.unwrap_or(1);
    let priority = raw.priority.unwrap_or(1);

    if let Some(target) = &raw.workflow {
        let subgraph = compile_one(target, all_raw, compiled, stack).map_err(|e| match e {
            RunbookError::UnknownWorkflowReference { target, .. } => {
                RunbookError::UnknownWorkflowReference { workflow: workflow.to_string(), service: scoped_name.to_string(), target }
            }
            other => other,
        })?;
        return Ok(Service {
            id: ServiceId::new(),
            scoped_name: scoped_name.to_string(),
            shared: raw.shared,
            retry: RetryPolicy::default(),
            skip,
            run_method,
            multiprocessing: raw.multiprocessing,
            max_processes,
            maximum_runs,
            priority,
            iteration: Iteration::default(),
            validation: Validation::default(),
            pre_post: PrePost::default(),
            notification: Notification::default(),
            kind: ServiceKind::Workflow(Box::new(subgraph)),
        });
    }

    Ok(Service {
        id: ServiceId::new(),
        scoped_name: scoped_name.to_string(),
        shared: raw.shared,
        retry: parse_retry(raw.retry.as_ref()),
        skip,
        run_method,
        multiprocessing: raw.multiprocessing,
        max_processes,
        maximum_runs,
        priority,
        iteration: parse_iteration(raw.iteration.as_ref()),
        validation: parse_validation(workflow, scoped_name, raw.validation.as_ref())?,
        pre_post: parse_pre_post(workflow, scoped_name, raw)?,
        notification: parse_notification(raw.notification.as_ref()),
        kind: if raw.connection { ServiceKind::Connection } else { ServiceKind::Atomic },
    })
}

fn parse_run_method(workflow: &str, service: &str, raw: Option<&str>) -> Result<RunMethod, RunbookError> {
    match raw {
        None => Ok(RunMethod::PerDevice),
        Some("per_device") => Ok(RunMethod::PerDevice),
        Some("per_service_with_workflow_targets") => Ok(RunMethod::PerServiceWithWorkflowTargets),
        Some("per_service_with_service_targets") => Ok(RunMethod::PerServiceWithServiceTargets),
        Some(other) => Err(RunbookError::InvalidEnumValue {
            workflow: workflow.to_string(),
            service: service.to_string(),
            field: "run_method".to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_skip_value(workflow: &str, service: &str, raw: Option<&str>) -> Result<Option<SkipValue>, RunbookError> {
    match raw {
        None => Ok(None),
        Some("success") => Ok(Some(SkipValue::Success)),
        Some("failure") => Ok(Some(SkipValue::Failure)),
        Some(other) => Err(RunbookError::InvalidEnumValue {
            workflow: workflow.to_string(),
            service: service.to_string(),
            field: "skip.skip_value".to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_skip(workflow: &str, service: &str, raw: Option<&RawSkip>) -> Result<SkipRule, RunbookError> {
    let Some(raw) = raw else { return Ok(SkipRule::default()) };
    let skip_value = parse_skip_value(workflow, service, raw.skip_value.as_deref())?.or(Some(SkipValue::Success));
    Ok(SkipRule { per_workflow: raw.per_workflow.clone(), skip_query: raw.skip_query.clone(), skip_value })
}

fn parse_retry(raw: Option<&RawRetry>) -> RetryPolicy {
    match raw {
        None => RetryPolicy::default(),
        Some(r) => RetryPolicy {
            number_of_retries: r.number_of_retries,
            time_between_retries_secs: r.time_between_retries,
            max_number_of_retries: r.max_number_of_retries,
        },
    }
}

fn parse_iteration(raw: Option<&RawIteration>) -> Iteration {
    match raw {
        None => Iteration::default(),
        Some(r) => Iteration {
            values: r.values.clone(),
            variable_name: r.variable_name.clone(),
            devices: r.devices.clone(),
            devices_property: r.devices_property.clone(),
        },
    }
}

fn parse_validation(workflow: &str, service: &str, raw: Option<&RawValidation>) -> Result<Validation, RunbookError> {
    let Some(raw) = raw else { return Ok(Validation::default()) };

    let condition = match raw.condition.as_deref() {
        None => Some(ValidationCondition::None),
        Some("none") => Some(ValidationCondition::None),
        Some("success") => Some(ValidationCondition::Success),
        Some("failure") => Some(ValidationCondition::Failure),
        Some(other) => {
            return Err(RunbookError::InvalidEnumValue {
                workflow: workflow.to_string(),
                service: service.to_string(),
                field: "validation.condition".to_string(),
                value: other.to_string(),
            })
        }
    };

    let method = match raw.method.as_deref() {
        None => None,
        Some("text") => Some(ValidationMethod::Text),
        Some("dict") => Some(ValidationMethod::Dict),
        Some(other) => {
            return Err(RunbookError::InvalidEnumValue {
                workflow: workflow.to_string(),
                service: service.to_string(),
                field: "validation.method".to_string(),
                value: other.to_string(),
            })
        }
    };

    Ok(Validation {
        condition,
        method,
        validation_section: raw.validation_section.clone(),
        content_match: raw.content_match.clone(),
        content_match_regex: raw.content_match_regex,
        negative_logic: raw.negative_logic,
        delete_spaces_before_matching: raw.delete_spaces_before_matching,
        dict_match: raw.dict_match.clone(),
        conversion_method: raw.conversion_method.clone(),
    })
}

fn parse_pre_post(workflow: &str, service: &str, raw: &RawService) -> Result<PrePost, RunbookError> {
    // Matches eNMS: postprocessing_mode defaults to "success", not "always".
    let postprocessing_mode = match raw.postprocessing_mode.as_deref() {
        None => PostprocessingMode::Success,
        Some("success") => PostprocessingMode::Success,
        Some("failure") => PostprocessingMode::Failure,
        Some("always") => PostprocessingMode::Always,
        Some(other) => {
            return Err(RunbookError::InvalidEnumValue {
                workflow: workflow.to_string(),
                service: service.to_string(),
                field: "postprocessing_mode".to_string(),
                value: other.to_string(),
            })
        }
    };
    Ok(PrePost { preprocessing: raw.preprocessing.clone(), postprocessing: raw.postprocessing.clone(), postprocessing_mode })
}

fn parse_notification(raw: Option<&RawNotification>) -> Notification {
    match raw {
        None => Notification::default(),
        Some(r) => Notification {
            send_notification: r.send_notification,
            notification_header: r.notification_header.clone(),
            notification_link: r.notification_link.clone(),
        },
    }
}

#[cfg(test)]
#[path = "compile_tests.rs"]
mod tests;
