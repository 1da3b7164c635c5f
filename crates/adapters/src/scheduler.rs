// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client to an external scheduler daemon. Every call is
//! best-effort: a connection, timeout, or malformed-response error degrades
//! to [`SchedulerOutcome::Unreachable`] rather than propagating, so the
//! engine never depends on the scheduler being alive.

use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const UNREACHABLE_MESSAGE: &str = "Scheduler Unreachable";

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerOutcome<T> {
    Ok(T),
    Unreachable,
}

pub struct SchedulerClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl SchedulerClient {
    pub fn new(base_url: impl Into<String>, bearer_token: Option<String>) -> Self {
        let http = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_default();
        Self { http, base_url: base_url.into(), bearer_token }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// `POST /schedule` with `{"mode": "schedule", "task": task}` → `{"active": bool, ...}`.
    pub async fn schedule(&self, task: Value) -> SchedulerOutcome<Value> {
        self.post_schedule("schedule", task).await
    }

    /// `POST /schedule` with `{"mode": "pause", "task": task}` → `{"active": bool, ...}`.
    pub async fn pause(&self, task: Value) -> SchedulerOutcome<Value> {
        self.post_schedule("pause", task).await
    }

    async fn post_schedule(&self, mode: &str, task: Value) -> SchedulerOutcome<Value> {
        let body = serde_json::json!({ "mode": mode, "task": task });
        match self.request(reqwest::Method::POST, "/schedule").json(&body).send().await {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(value) => SchedulerOutcome::Ok(value),
                Err(_) => SchedulerOutcome::Unreachable,
            },
            Err(_) => SchedulerOutcome::Unreachable,
        }
    }

    /// `POST /delete_job/<task_id>`.
    pub async fn delete(&self, task_id: &str) -> SchedulerOutcome<Value> {
        match self.request(reqwest::Method::POST, &format!("/delete_job/{task_id}")).send().await {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(value) => SchedulerOutcome::Ok(value),
                Err(_) => SchedulerOutcome::Unreachable,
            },
            Err(_) => SchedulerOutcome::Unreachable,
        }
    }

    /// `GET /next_runtime/<task_id>` → a JSON string scalar.
    pub async fn next_runtime(&self, task_id: &str) -> SchedulerOutcome<String> {
        self.get_scalar(&format!("/next_runtime/{task_id}")).await
    }

    /// `GET /time_left/<task_id>` → a JSON string scalar.
    pub async fn time_left(&self, task_id: &str) -> SchedulerOutcome<String> {
        self.get_scalar(&format!("/time_left/{task_id}")).await
    }

    async fn get_scalar(&self, path: &str) -> SchedulerOutcome<String> {
        match self.request(reqwest::Method::GET, path).send().await {
            Ok(resp) => match resp.json::<Value>().await {
                Ok(Value::String(s)) => SchedulerOutcome::Ok(s),
                _ => SchedulerOutcome::Unreachable,
            },
            Err(_) => SchedulerOutcome::Unreachable,
        }
    }
}

impl<T> SchedulerOutcome<T> {
    pub fn unreachable_message() -> &'static str {
        UNREACHABLE_MESSAGE
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
