// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Workflow Engine: the graph walk over one `Workflow`'s services and
//! edges. Single-threaded per run — all parallelism lives inside the
//! Runner it dispatches to.

use crate::paths;
use crate::runner::{InvokeCtx, Runner};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use wfe_core::{
    Clock, Device, DeviceId, DeviceSet, EdgeSubtype, Outcome, Run, RunMethod, Service, ServiceId,
    SkipValue, WorkflowGraph,
};
use wfe_storage::WriteMode;

/// Arguments to one workflow-engine invocation.
pub struct EngineCtx<'a> {
    pub run: &'a Run,
    pub workflow: &'a WorkflowGraph,
    pub run_method: RunMethod,
    pub start_services: &'a [ServiceId],
    pub start_targets: DeviceSet,
    pub payload: Value,
}

/// A pending dispatch: ordered by `1/priority` (higher priority first),
/// ties broken by insertion order (earlier wins).
struct PendingEntry {
    service_id: ServiceId,
    priority: u32,
    seq: u64,
}

impl PartialEq for PendingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for PendingEntry {}

impl PartialOrd for PendingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingEntry {
    /// `BinaryHeap` is a max-heap: higher priority compares greater so it
    /// pops first; for equal priority, the entry with the *smaller*
    /// sequence number (inserted earlier) compares greater, so FIFO order
    /// is preserved among ties.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Run the graph walk to completion.
pub async fn run<C: Clock>(runner: &Runner<C>, ctx: EngineCtx<'_>) -> Outcome {
    let mut pending: BinaryHeap<PendingEntry> = BinaryHeap::new();
    let mut run_count: HashMap<ServiceId, u32> = HashMap::new();
    let mut visited: HashSet<ServiceId> = HashSet::new();
    let mut targets: HashMap<ServiceId, DeviceSet> = HashMap::new();
    let mut seq: u64 = 0;

    let bfs = ctx.run_method.is_bfs();

    // `DeviceSummary` only carries ids; this recovers the full `Device`
    // record (name/properties) a propagated id refers to, seeded from the
    // devices the run actually started with and extended as new target
    // sets are observed.
    let mut device_lookup: HashMap<DeviceId, Device> =
        ctx.start_targets.iter().map(|d| (d.id, d.clone())).collect();

    for service_id in ctx.start_services {
        let Some(service) = ctx.workflow.find(*service_id) else { continue };
        targets.insert(service.id, ctx.start_targets.clone());
        pending.push(PendingEntry { service_id: service.id, priority: service.priority_or_coerced(), seq });
        seq += 1;
    }

    let mut payload = ctx.payload;

    while let Some(entry) = pending.pop() {
        if runner.registry().is_stopped(&ctx.run.runtime) {
            return Outcome { success: false, result: Value::String("Aborted".into()), summary: Default::default(), payload };
        }

        let Some(service) = ctx.workflow.find(entry.service_id) else { continue };

        let count = run_count.entry(service.id).or_insert(0);
        if *count >= service.maximum_runs {
            continue;
        }
        *count += 1;
        visited.insert(service.id);

        let service_targets = targets.get(&service.id).cloned().unwrap_or_default();
        for device in service_targets.iter() {
            device_lookup.entry(device.id).or_insert_with(|| device.clone());
        }

        let outcome = if service.is_start() || service.is_end() || service.skip.is_forced_for(&ctx.workflow.name) {
            let success = service.skip.skip_value.unwrap_or(SkipValue::Success).as_success();
            let summary = if bfs {
                wfe_core::DeviceSummary { success: service_targets.ids().collect(), failure: Vec::new() }
            } else {
                wfe_core::DeviceSummary::default()
            };
            Outcome { success, result: Value::String("skipped".into()), summary, payload: payload.clone() }
        } else {
            let exec_service = resolve_placeholder(ctx.workflow, ctx.run, service);
            // Non-BFS mode walks the graph for exactly one device (the
            // caller loops per device) so every step along the way acts on
            // that same device, not whatever `service_targets` happened to
            // accumulate.
            let target_devices = if bfs { service_targets.clone() } else { ctx.start_targets.clone() };
            let invoked = runner
                .invoke(InvokeCtx {
                    run: ctx.run,
                    service: exec_service,
                    workflow: Some(ctx.workflow),
                    target_devices,
                    payload: payload.clone(),
                })
                .await;
            invoked
        };

        payload = outcome.payload.clone();
        let status_success = outcome.success;

        // Step 8: progress, plain per-device workflow walk only (`!bfs`
        // already implies `run_method == PerDevice`, the only non-BFS kind).
        if !bfs {
            let path = if status_success { paths::progress_service_success() } else { paths::progress_service_failure() };
            let _ = runner.store().write_state(&ctx.run.runtime, &path, WriteMode::Increment(1)).await;
        }

        // Step 9: edge propagation.
        for edge_type in [EdgeSubtype::Success, EdgeSubtype::Failure] {
            if !bfs {
                let status_type = EdgeSubtype::from_success(status_success);
                if edge_type != status_type {
                    continue;
                }
            } else {
                let bucket = bucket_for(&outcome, edge_type, &device_lookup);
                if bucket.is_empty() {
                    continue;
                }
            }

            for (successor, edge) in ctx.workflow.neighbors(service.id, wfe_core::Direction::Destination, edge_type) {
                if bfs {
                    let bucket = bucket_for(&outcome, edge_type, &device_lookup);
                    targets.entry(successor.id).or_default().extend(bucket.iter().cloned());
                    let _ = runner
                        .store()
                        .write_state(&ctx.run.runtime, &paths::edge(edge.id), WriteMode::Increment(bucket.len() as i64))
                        .await;
                } else {
                    let _ = runner
                        .store()
                        .write_state(&ctx.run.runtime, &paths::edge(edge.id), WriteMode::Set(Value::String("DONE".into())))
                        .await;
                }
                pending.push(PendingEntry { service_id: successor.id, priority: successor.priority_or_coerced(), seq });
                seq += 1;
            }
        }
    }

    // Termination.
    if bfs {
        let Some(start) = ctx.workflow.start() else {
            return Outcome::new(false, payload);
        };
        let Some(end) = ctx.workflow.end() else {
            return Outcome::new(false, payload);
        };
        let arrived_start = targets.get(&start.id).cloned().unwrap_or_default();
        let arrived_end = targets.get(&end.id).cloned().unwrap_or_default();
        let failed = arrived_start.difference(&arrived_end);
        Outcome {
            success: failed.is_empty(),
            result: Value::Null,
            summary: wfe_core::DeviceSummary { success: arrived_end.ids().collect(), failure: failed.ids().collect() },
            payload,
        }
    } else {
        let Some(end) = ctx.workflow.end() else {
            return Outcome::new(false, payload);
        };
        let success = visited.contains(&end.id);
        let summary = if success {
            wfe_core::DeviceSummary { success: ctx.start_targets.ids().collect(), failure: Vec::new() }
        } else {
            wfe_core::DeviceSummary { success: Vec::new(), failure: ctx.start_targets.ids().collect() }
        };
        Outcome { success, result: Value::Null, summary, payload }
    }
}

fn bucket_for(outcome: &Outcome, edge_type: EdgeSubtype, lookup: &HashMap<DeviceId, Device>) -> DeviceSet {
    let ids = match edge_type {
        EdgeSubtype::Success => &outcome.summary.success,
        EdgeSubtype::Failure => &outcome.summary.failure,
    };
    ids.iter().filter_map(|id| lookup.get(id).cloned()).collect()
}

/// A `Placeholder` node is executed as whatever service the run
/// designates, while graph-walk bookkeeping (`run_count`/`targets`/edges)
/// stays keyed on the placeholder's own id.
fn resolve_placeholder<'a>(workflow: &'a WorkflowGraph, run: &Run, service: &'a Service) -> &'a Service {
    if !service.is_placeholder() {
        return service;
    }
    run.placeholder.and_then(|id| workflow.find(id)).unwrap_or(service)
}

#[cfg(test)]
#[path = "workflow_engine_tests.rs"]
mod tests;
