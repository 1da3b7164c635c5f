// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Run Controller: assigns a run its `runtime`, registers its
//! resolved device set with the [`wfe_core::RunRegistry`], builds and
//! awaits the root [`Runner`] invocation, and commits the finished run's
//! aggregate fields.
//!
//! Resolving a caller's RBAC-permitted device set is someone else's job —
//! [`StartRequest::devices`] is the already-resolved set the controller
//! registers verbatim, except on restart, where the prior run's
//! `target_devices`/`target_pools` take precedence.

use crate::runner::{InvokeCtx, Runner};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use wfe_core::{Clock, Device, DeviceSet, ExecutionResult, Run, RunStatus, Runtime, Service, ServiceId, Trigger};

/// Arguments to start a new top-level run.
pub struct StartRequest {
    pub service: Service,
    pub devices: DeviceSet,
    pub target_pools: Vec<String>,
    pub payload: Value,
    pub trigger: Trigger,
    pub placeholder: Option<ServiceId>,
    /// Subset of `service`'s nodes to seed the walk from; empty means the
    /// implicit `{Start.id}` seed.
    pub start_services: Vec<ServiceId>,
    /// When set, this run restarts `restart_run`: its `target_devices` and
    /// `target_pools` are inherited, but its state is not.
    pub restart_run: Option<Run>,
}

pub struct Controller<C: Clock> {
    runner: Runner<C>,
    clock: C,
    seq: Arc<AtomicU64>,
}

impl<C: Clock> Controller<C> {
    pub fn new(runner: Runner<C>, clock: C) -> Self {
        Self { runner, clock, seq: Arc::new(AtomicU64::new(0)) }
    }

    pub fn runner(&self) -> &Runner<C> {
        &self.runner
    }

    /// Set this run's `stop` flag; in-flight Runners observe it at their
    /// next safe point and return `Aborted`.
    pub fn stop(&self, runtime: &Runtime) {
        self.runner.registry().stop(runtime);
    }

    pub async fn start(&self, request: StartRequest) -> Run {
        let runtime = Runtime::new(self.clock.epoch_ms(), self.seq.fetch_add(1, Ordering::Relaxed));

        // Restart: target_devices and target_pools are inherited from the
        // prior run, not the new request. The prior run only kept device
        // ids, not full records, so a matching record in `request.devices`
        // (the RBAC-resolved set, the controller's only source of full
        // device metadata) fills in name/properties when available; an id
        // with no match still propagates, just without metadata.
        let (devices, target_pools) = match &request.restart_run {
            Some(prior) => {
                let inherited: DeviceSet = prior
                    .target_devices
                    .iter()
                    .map(|id| request.devices.get(id).cloned().unwrap_or_else(|| Device::new(*id, id.to_string())))
                    .collect();
                (inherited, prior.target_pools.clone())
            }
            None => (request.devices.clone(), request.target_pools.clone()),
        };

        let mut run = Run::top_level(runtime.clone(), request.service.id, request.trigger);
        run.payload = request.payload.clone();
        run.target_devices = devices.ids().collect();
        run.target_pools = target_pools;
        run.restart_run = request.restart_run.as_ref().map(|prior| prior.runtime.clone());
        run.placeholder = request.placeholder;
        run.start_services = request.start_services.clone();

        self.runner.registry().register(runtime.clone(), devices.clone(), None);

        let started = self.clock.now();
        let outcome = self
            .runner
            .invoke(InvokeCtx {
                run: &run,
                service: &request.service,
                workflow: None,
                target_devices: devices,
                payload: request.payload,
            })
            .await;
        let duration_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64;

        let state = self.runner.store().get_state(&runtime).await.ok();
        self.runner.registry().finalize(&runtime);

        let aborted = outcome.result == Value::String("Aborted".into());
        run.success = Some(outcome.success);
        run.payload = outcome.payload.clone();
        run.status = if aborted { RunStatus::Aborted } else { RunStatus::Completed };
        run.results =
            Some(ExecutionResult::aggregate(runtime, request.service.id, outcome.success, outcome.result, duration_ms));
        run.state = state;
        run
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
