// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Runner: executes one service invocation end to end — target
//! resolution, iteration expansion, skip, preprocessing, per-device
//! execution with retries and validation, postprocessing, aggregation, and
//! notification. When the service is itself a Workflow, the Runner
//! delegates to [`crate::workflow_engine`] instead of running those steps
//! directly.

use crate::paths;
use crate::sleeper::Sleeper;
use crate::validation;
use crate::workflow_engine;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wfe_adapters::{DeviceDriver, DriverError, NotifyAdapter};
use wfe_core::{
    Clock, Device, DeviceId, DeviceSet, DeviceSummary, EngineError, ExecutionResult, Outcome,
    ResultId, Run, RunMethod, RunRegistry, Runtime, Service, SkipValue, WorkflowGraph,
};
use wfe_expr::{evaluate_device_set, Bindings, Expr};
use wfe_storage::{StateStore, WriteMode};

/// What the Runner is asked to invoke: a service within (optionally) a
/// containing workflow, the resolved-so-far target devices, and the
/// payload to carry in.
pub struct InvokeCtx<'a> {
    pub run: &'a Run,
    pub service: &'a Service,
    pub workflow: Option<&'a WorkflowGraph>,
    pub target_devices: DeviceSet,
    pub payload: Value,
}

/// Executes one service invocation. Cheap to clone — every field is an
/// `Arc` or a `Clone` value type — so fan-out workers can each hold a copy.
pub struct Runner<C: Clock> {
    driver: Arc<dyn DeviceDriver>,
    notifier: Arc<dyn NotifyAdapter>,
    store: Arc<dyn StateStore>,
    sleeper: Arc<dyn Sleeper>,
    registry: RunRegistry,
    clock: C,
    seq: Arc<AtomicU64>,
}

impl<C: Clock> Clone for Runner<C> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
            notifier: self.notifier.clone(),
            store: self.store.clone(),
            sleeper: self.sleeper.clone(),
            registry: self.registry.clone(),
            clock: self.clock.clone(),
            seq: self.seq.clone(),
        }
    }
}

impl<C: Clock> Runner<C> {
    pub fn new(
        driver: Arc<dyn DeviceDriver>,
        notifier: Arc<dyn NotifyAdapter>,
        store: Arc<dyn StateStore>,
        sleeper: Arc<dyn Sleeper>,
        registry: RunRegistry,
        clock: C,
    ) -> Self {
        Self { driver, notifier, store, sleeper, registry, clock, seq: Arc::new(AtomicU64::new(0)) }
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Invoke `ctx.service`. Delegates to the workflow engine when the
    /// service carries a sub-graph; otherwise runs one invocation end to
    /// end, expanding `iteration_values` around it when configured.
    pub async fn invoke(&self, ctx: InvokeCtx<'_>) -> Outcome {
        if ctx.service.is_workflow() {
            return self.invoke_workflow(ctx).await;
        }

        let iterations = match self.resolve_iterations(ctx.service, &ctx.payload, ctx.run) {
            Ok(it) => it,
            Err(e) => {
                let summary = DeviceSummary { success: Vec::new(), failure: ctx.target_devices.ids().collect() };
                return Outcome {
                    success: false,
                    result: Value::String(format!("iteration error: {e}")),
                    summary,
                    payload: ctx.payload,
                };
            }
        };

        let base_targets = self.resolve_targets(ctx.run, ctx.service, &ctx.target_devices);
        let mut outcomes = Vec::with_capacity(iterations.len());
        for (iter_payload, devices_override) in iterations {
            let devices = devices_override.unwrap_or_else(|| base_targets.clone());
            outcomes.push(self.run_one(ctx.run, ctx.workflow, ctx.service, devices, iter_payload).await);
        }
        merge_outcomes(outcomes)
    }

    /// Returns a boxed future rather than being declared `async fn`: the
    /// workflow engine's dispatch loop calls back into [`Runner::invoke`]
    /// for every service it pops, including nested workflows, which makes
    /// `invoke` and `invoke_workflow` mutually recursive. An `async fn`
    /// cycle there has no finite state-machine size; boxing this one leg
    /// gives the compiler a fixed-size `Pin<Box<dyn Future>>` to close the
    /// loop with.
    fn invoke_workflow<'a>(&'a self, ctx: InvokeCtx<'a>) -> Pin<Box<dyn Future<Output = Outcome> + Send + 'a>> {
        Box::pin(async move {
            let Some(graph) = ctx.service.as_workflow() else {
                return Outcome::new(false, ctx.payload);
            };
            let Some(start) = graph.start() else {
                return Outcome::new(false, ctx.payload);
            };

            let child_runtime = Runtime::new(self.clock.epoch_ms(), self.next_seq());
            let mut child_run = Run::child(child_runtime.clone(), ctx.run, ctx.service.id);
            child_run.payload = ctx.payload.clone();
            let targets = self.resolve_targets(ctx.run, ctx.service, &ctx.target_devices);
            self.registry.register(child_runtime.clone(), targets.clone(), Some(&ctx.run.runtime));

            // `start_services` seeds only the run's own root workflow,
            // never a nested one: `ctx.run` is that run exactly
            // when it's still the service being dispatched right now
            // (`ctx.run.service == ctx.service.id`) — for a nested workflow
            // dispatched from within, `ctx.run` is the *enclosing*
            // workflow's bookkeeping run instead, whose `start_services`
            // doesn't name nodes of this sub-graph.
            let start_services = if ctx.run.service == ctx.service.id && !ctx.run.start_services.is_empty() {
                ctx.run.start_services.clone()
            } else {
                vec![start.id]
            };

            // per_device (non-BFS) mode runs the engine once per device,
            // each call taking exactly one edge subtype based on
            // that device's own outcome; the two BFS modes propagate device
            // sets along edges within a single call instead, so they run
            // once against the whole resolved target set.
            let outcome = if ctx.service.run_method == RunMethod::PerDevice && targets.len() > 1 {
                let mut outcomes = Vec::with_capacity(targets.len());
                for device in targets.iter() {
                    outcomes.push(
                        workflow_engine::run(
                            self,
                            workflow_engine::EngineCtx {
                                run: &child_run,
                                workflow: graph,
                                run_method: ctx.service.run_method,
                                start_services: &start_services,
                                start_targets: DeviceSet::from_devices([device.clone()]),
                                payload: ctx.payload.clone(),
                            },
                        )
                        .await,
                    );
                }
                merge_outcomes(outcomes)
            } else {
                workflow_engine::run(
                    self,
                    workflow_engine::EngineCtx {
                        run: &child_run,
                        workflow: graph,
                        run_method: ctx.service.run_method,
                        start_services: &start_services,
                        start_targets: targets,
                        payload: ctx.payload,
                    },
                )
                .await
            };

            self.registry.finalize(&child_runtime);
            outcome
        })
    }

    /// Step 1: resolve target devices. Only `per_device` services default
    /// to the run's permitted device set when none were forwarded.
    fn resolve_targets(&self, run: &Run, service: &Service, target_devices: &DeviceSet) -> DeviceSet {
        if matches!(service.run_method, RunMethod::PerDevice) && target_devices.is_empty() {
            self.registry.targets(&run.parent_runtime).unwrap_or_default()
        } else {
            target_devices.clone()
        }
    }

    /// Step 2: expand `iteration_values` into `(payload, devices_override)`
    /// pairs. A service with no active iteration config yields exactly one
    /// pair with no device override.
    fn resolve_iterations(
        &self,
        service: &Service,
        payload: &Value,
        run: &Run,
    ) -> Result<Vec<(Value, Option<DeviceSet>)>, EngineError> {
        if !service.iteration.is_active() {
            return Ok(vec![(payload.clone(), None)]);
        }

        let values_src = service.iteration.values.as_deref().unwrap_or("[]");
        let expr = parse_expr(values_src)?;
        let bindings = Bindings::new(payload.clone(), Value::Null, run_json(run), Value::Null);
        let values = expr.evaluate_sequence(&bindings).map_err(|e| EngineError::UserCodeError(e.to_string()))?;

        let devices_expr = match &service.iteration.devices {
            Some(src) => Some(parse_expr(src)?),
            None => None,
        };

        let mut out = Vec::with_capacity(values.len());
        for value in values {
            let mut iter_payload = payload.clone();
            if let (Some(var), Value::Object(obj)) = (&service.iteration.variable_name, &mut iter_payload) {
                obj.insert(var.clone(), value.clone());
            }
            let devices = match &devices_expr {
                Some(expr) => {
                    let bindings = Bindings::new(iter_payload.clone(), Value::Null, run_json(run), Value::Null);
                    Some(
                        evaluate_device_set(expr, &bindings)
                            .map_err(|e| EngineError::UserCodeError(e.to_string()))?,
                    )
                }
                None => None,
            };
            out.push((iter_payload, devices));
        }
        Ok(out)
    }

    /// Steps 3-9 for one `(target_devices, payload)` pair.
    async fn run_one(
        &self,
        run: &Run,
        workflow: Option<&WorkflowGraph>,
        service: &Service,
        target_devices: DeviceSet,
        mut payload: Value,
    ) -> Outcome {
        let workflow_name = workflow.map(|w| w.name.as_str()).unwrap_or("");

        // Step 3: skip.
        if self.should_skip(service, workflow_name, &payload, run) {
            let success = service.skip.skip_value.unwrap_or(SkipValue::Success).as_success();
            return Outcome {
                success,
                result: Value::String("skipped".into()),
                summary: skip_summary(success, &target_devices),
                payload,
            };
        }

        if self.registry.is_stopped(&run.runtime) {
            return aborted_outcome(&target_devices, payload);
        }

        // Step 4: preprocessing.
        match self.run_user_code(&service.pre_post.preprocessing, run, &payload) {
            Ok(Some(patch)) => merge_payload(&mut payload, patch),
            Ok(None) => {}
            Err(e) => {
                return Outcome {
                    success: false,
                    result: Value::String(format!("preprocessing error: {e}")),
                    summary: skip_summary(false, &target_devices),
                    payload,
                };
            }
        }

        if self.registry.is_stopped(&run.runtime) {
            return aborted_outcome(&target_devices, payload);
        }

        // Steps 5-6: per-device execution with retries and validation.
        let started = self.clock.now();
        let aggregate_id = ResultId::new();
        let summary = self.run_per_device(&run.runtime, service, &target_devices, &payload, aggregate_id).await;
        let overall_success = summary.failure.is_empty();
        let duration_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64;

        // Step 8: aggregate.
        let result = serde_json::json!({ "success": summary.success, "failure": summary.failure });
        let record =
            ExecutionResult::aggregate(run.runtime.clone(), service.id, overall_success, result.clone(), duration_ms);
        if let Ok(line) = serde_json::to_string(&record) {
            let _ = self.store.log_append(&run.runtime, service.id, line).await;
        }

        // Step 7: postprocessing.
        if service.pre_post.postprocessing_mode.matches(overall_success) {
            if let Ok(Some(patch)) = self.run_user_code(&service.pre_post.postprocessing, run, &payload) {
                merge_payload(&mut payload, patch);
            }
        }

        // Step 9: notification. Failures here never change the outcome.
        self.maybe_notify(service, overall_success, &summary).await;

        Outcome { success: overall_success, result, summary, payload }
    }

    fn should_skip(&self, service: &Service, workflow_name: &str, payload: &Value, run: &Run) -> bool {
        if service.skip.is_forced_for(workflow_name) {
            return true;
        }
        let Some(query) = &service.skip.skip_query else { return false };
        let Ok(expr) = Expr::parse(query.as_str()) else { return false };
        let bindings = Bindings::new(payload.clone(), Value::Null, run_json(run), Value::Null);
        expr.evaluate_truthy(&bindings).unwrap_or(false)
    }

    fn run_user_code(&self, code: &Option<String>, run: &Run, payload: &Value) -> Result<Option<Value>, EngineError> {
        let Some(src) = code else { return Ok(None) };
        let expr = parse_expr(src)?;
        let bindings = Bindings::new(payload.clone(), Value::Null, run_json(run), Value::Null);
        let value = expr.evaluate(&bindings).map_err(|e| EngineError::UserCodeError(e.to_string()))?;
        Ok(Some(value))
    }

    /// The `DeviceDriver` seam only exposes per-device execution, so both
    /// `per_device` and the two BFS run methods drive it the same way: one
    /// call per target device, aggregated into a summary. Bulk dispatch is
    /// left to the driver implementation rather than a separate
    /// batch-shaped driver trait.
    async fn run_per_device(
        &self,
        run_runtime: &Runtime,
        service: &Service,
        devices: &DeviceSet,
        payload: &Value,
        aggregate_id: ResultId,
    ) -> DeviceSummary {
        let mut summary = DeviceSummary::default();
        if devices.is_empty() {
            return summary;
        }

        if !service.multiprocessing || service.max_processes <= 1 {
            for device in devices.iter() {
                if self.registry.is_stopped(run_runtime) {
                    break;
                }
                let (id, success) = self
                    .execute_device(run_runtime.clone(), service.clone(), device.clone(), payload.clone(), aggregate_id)
                    .await;
                push_bucket(&mut summary, id, success);
            }
            return summary;
        }

        let semaphore = Arc::new(tokio::sync::Semaphore::new(service.max_processes as usize));
        let mut set = tokio::task::JoinSet::new();
        for device in devices.iter().cloned() {
            if self.registry.is_stopped(run_runtime) {
                break;
            }
            let this = self.clone();
            let run_runtime = run_runtime.clone();
            let service = service.clone();
            let payload = payload.clone();
            let permit = semaphore.clone();
            set.spawn(async move {
                let _permit = permit.acquire_owned().await;
                this.execute_device(run_runtime, service, device, payload, aggregate_id).await
            });
        }
        while let Some(joined) = set.join_next().await {
            if let Ok((id, success)) = joined {
                push_bucket(&mut summary, id, success);
            }
        }
        summary
    }

    async fn execute_device(
        &self,
        run_runtime: Runtime,
        service: Service,
        device: Device,
        payload: Value,
        aggregate_id: ResultId,
    ) -> (DeviceId, bool) {
        let start = self.clock.now();
        let (success, result) = self.run_device_with_retries(&run_runtime, &service, &device, &payload).await;
        let duration_ms = self.clock.now().saturating_duration_since(start).as_millis() as u64;

        let record =
            ExecutionResult::per_device(run_runtime.clone(), service.id, device.id, success, result, duration_ms, aggregate_id);
        if let Ok(line) = serde_json::to_string(&record) {
            let _ = self.store.log_append(&run_runtime, service.id, line).await;
        }

        let bucket = if success { "success" } else { "failure" };
        for path in [
            paths::progress_service_device(service.id, bucket),
            paths::progress_service_device(service.id, "total"),
            paths::service_progress_device(service.id, bucket),
            paths::service_progress_device(service.id, "total"),
        ] {
            let _ = self.store.write_state(&run_runtime, &path, WriteMode::Increment(1)).await;
        }

        (device.id, success)
    }

    /// Validation lives in [`validation::validate`]; this loop is the retry
    /// contract: up to `min(number_of_retries, max_number_of_retries) + 1`
    /// attempts, `time_between_retries` between them, stopping early on
    /// success, a permanent driver error, or a validation error.
    async fn run_device_with_retries(
        &self,
        run_runtime: &Runtime,
        service: &Service,
        device: &Device,
        payload: &Value,
    ) -> (bool, Value) {
        let attempts = service.retry.attempts();
        let mut last_success = false;
        let mut last_result = Value::Null;

        for attempt in 0..attempts {
            if self.registry.is_stopped(run_runtime) {
                return (false, Value::String("Aborted".into()));
            }

            let (raw_success, result_value, permanent) = match self.driver.run(device, payload).await {
                Ok(outcome) => (outcome.success, outcome.result, false),
                Err(DriverError::Transient(msg)) => (false, Value::String(msg), false),
                Err(DriverError::Permanent(msg)) => (false, Value::String(msg), true),
            };

            let validated = validation::validate(&service.validation, raw_success, &result_value);
            let validation_errored = validated.is_err();
            let (success, result_value) = match validated {
                Ok(Some(v)) => (v, result_value),
                Ok(None) => (raw_success, result_value),
                Err(e) => (false, Value::String(e.to_string())),
            };

            last_success = success;
            last_result = result_value;

            if success || permanent || validation_errored {
                break;
            }
            if attempt + 1 < attempts {
                self.sleeper.sleep(Duration::from_secs(service.retry.time_between_retries_secs)).await;
            }
        }

        (last_success, last_result)
    }

    async fn maybe_notify(&self, service: &Service, success: bool, summary: &DeviceSummary) {
        if !service.notification.send_notification {
            return;
        }
        let header = service.notification.notification_header.as_deref().unwrap_or(&service.scoped_name);
        let outcome_word = if success { "success" } else { "failure" };
        let mut body = format!(
            "{outcome_word}\nsuccess: {:?}\nfailure: {:?}",
            summary.success, summary.failure
        );
        if let Some(link) = &service.notification.notification_link {
            body.push('\n');
            body.push_str(link);
        }
        let _ = self.notifier.notify(header, &body).await;
    }
}

fn parse_expr(source: &str) -> Result<Expr, EngineError> {
    Expr::parse(source).map_err(|e| EngineError::UserCodeError(e.to_string()))
}

fn run_json(run: &Run) -> Value {
    serde_json::to_value(run).unwrap_or(Value::Null)
}

fn merge_payload(payload: &mut Value, patch: Value) {
    if let Value::Object(patch_map) = patch {
        if let Value::Object(base_map) = payload {
            for (k, v) in patch_map {
                base_map.insert(k, v);
            }
        }
    }
}

fn push_bucket(summary: &mut DeviceSummary, id: DeviceId, success: bool) {
    if success {
        summary.success.push(id);
    } else {
        summary.failure.push(id);
    }
}

fn skip_summary(success: bool, target_devices: &DeviceSet) -> DeviceSummary {
    if success {
        DeviceSummary { success: target_devices.ids().collect(), failure: Vec::new() }
    } else {
        DeviceSummary { success: Vec::new(), failure: target_devices.ids().collect() }
    }
}

fn aborted_outcome(target_devices: &DeviceSet, payload: Value) -> Outcome {
    Outcome {
        success: false,
        result: Value::String("Aborted".into()),
        summary: DeviceSummary { success: Vec::new(), failure: target_devices.ids().collect() },
        payload,
    }
}

fn merge_outcomes(mut outcomes: Vec<Outcome>) -> Outcome {
    if outcomes.len() == 1 {
        return outcomes.remove(0);
    }
    let success = outcomes.iter().all(|o| o.success);
    let mut summary = DeviceSummary::default();
    let mut results = Vec::with_capacity(outcomes.len());
    let mut payload = Value::Null;
    for outcome in outcomes {
        for id in outcome.summary.success {
            if !summary.success.contains(&id) {
                summary.success.push(id);
            }
        }
        for id in outcome.summary.failure {
            if !summary.failure.contains(&id) {
                summary.failure.push(id);
            }
        }
        results.push(outcome.result);
        payload = outcome.payload;
    }
    Outcome { success, result: Value::Array(results), summary, payload }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
