// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn schedule_posts_mode_and_task_and_returns_active() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active": true})))
        .mount(&server)
        .await;

    let client = SchedulerClient::new(server.uri(), None);
    let outcome = client.schedule(json!({"id": "t1"})).await;
    assert_eq!(outcome, SchedulerOutcome::Ok(json!({"active": true})));
}

#[tokio::test]
async fn pause_uses_mode_pause() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active": false})))
        .mount(&server)
        .await;

    let client = SchedulerClient::new(server.uri(), None);
    let outcome = client.pause(json!({"id": "t1"})).await;
    assert_eq!(outcome, SchedulerOutcome::Ok(json!({"active": false})));
}

#[tokio::test]
async fn delete_posts_to_delete_job_with_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/delete_job/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = SchedulerClient::new(server.uri(), None);
    let outcome = client.delete("t1").await;
    assert_eq!(outcome, SchedulerOutcome::Ok(json!({"ok": true})));
}

#[tokio::test]
async fn next_runtime_returns_the_string_scalar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/next_runtime/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("2026-07-29T00:00:00Z")))
        .mount(&server)
        .await;

    let client = SchedulerClient::new(server.uri(), None);
    let outcome = client.next_runtime("t1").await;
    assert_eq!(outcome, SchedulerOutcome::Ok("2026-07-29T00:00:00Z".to_string()));
}

#[tokio::test]
async fn an_unreachable_server_degrades_instead_of_erroring() {
    // Nothing is listening on this port.
    let client = SchedulerClient::new("http://127.0.0.1:1", None);
    assert_eq!(client.schedule(json!({})).await, SchedulerOutcome::Unreachable);
    assert_eq!(client.next_runtime("t1").await, SchedulerOutcome::Unreachable);
}

#[tokio::test]
async fn bearer_token_is_sent_as_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/schedule"))
        .and(wiremock::matchers::header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active": true})))
        .mount(&server)
        .await;

    let client = SchedulerClient::new(server.uri(), Some("secret-token".to_string()));
    let outcome = client.schedule(json!({})).await;
    assert_eq!(outcome, SchedulerOutcome::Ok(json!({"active": true})));
}
