// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use wfe_core::ServiceId;

fn runtime(s: &str) -> Runtime {
    Runtime::from_string(s)
}

#[tokio::test]
async fn get_state_is_null_for_an_unknown_runtime() {
    let store = LocalStore::new();
    assert_eq!(store.get_state(&runtime("r1")).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn write_state_set_is_visible_through_get_state() {
    let store = LocalStore::new();
    let rt = runtime("r1");
    store.write_state(&rt, "progress/service/success", WriteMode::Set(json!(1))).await.unwrap();
    let tree = store.get_state(&rt).await.unwrap();
    assert_eq!(path::get(&tree, "progress/service/success"), Some(&json!(1)));
}

#[tokio::test]
async fn write_state_increment_accumulates() {
    let store = LocalStore::new();
    let rt = runtime("r1");
    store.write_state(&rt, "progress/service/success", WriteMode::Increment(1)).await.unwrap();
    store.write_state(&rt, "progress/service/success", WriteMode::Increment(2)).await.unwrap();
    let tree = store.get_state(&rt).await.unwrap();
    assert_eq!(path::get(&tree, "progress/service/success"), Some(&json!(3)));
}

#[tokio::test]
async fn write_state_append_builds_a_list() {
    let store = LocalStore::new();
    let rt = runtime("r1");
    store.write_state(&rt, "edges/e1", WriteMode::Append(json!("a"))).await.unwrap();
    store.write_state(&rt, "edges/e1", WriteMode::Append(json!("b"))).await.unwrap();
    let tree = store.get_state(&rt).await.unwrap();
    assert_eq!(path::get(&tree, "edges/e1"), Some(&json!(["a", "b"])));
}

#[tokio::test]
async fn runtimes_do_not_share_state() {
    let store = LocalStore::new();
    store.write_state(&runtime("r1"), "a", WriteMode::Set(json!(1))).await.unwrap();
    let tree = store.get_state(&runtime("r2")).await.unwrap();
    assert_eq!(tree, Value::Null);
}

#[tokio::test]
async fn log_append_and_log_range_preserve_order() {
    let store = LocalStore::new();
    let rt = runtime("r1");
    let svc = ServiceId::new();
    store.log_append(&rt, svc, "first".to_string()).await.unwrap();
    store.log_append(&rt, svc, "second".to_string()).await.unwrap();
    store.log_append(&rt, svc, "third".to_string()).await.unwrap();

    let all = store.log_range(&rt, svc, 0).await.unwrap();
    assert_eq!(all, vec!["first", "second", "third"]);

    let tail = store.log_range(&rt, svc, 1).await.unwrap();
    assert_eq!(tail, vec!["second", "third"]);
}

#[tokio::test]
async fn log_range_for_unknown_service_is_empty() {
    let store = LocalStore::new();
    let tail = store.log_range(&runtime("r1"), ServiceId::new(), 0).await.unwrap();
    assert!(tail.is_empty());
}

#[tokio::test]
async fn clear_removes_state_and_logs_for_that_runtime_only() {
    let store = LocalStore::new();
    let rt = runtime("r1");
    let other = runtime("r2");
    let svc = ServiceId::new();
    store.write_state(&rt, "a", WriteMode::Set(json!(1))).await.unwrap();
    store.write_state(&other, "a", WriteMode::Set(json!(1))).await.unwrap();
    store.log_append(&rt, svc, "line".to_string()).await.unwrap();

    store.clear(&rt).await.unwrap();

    assert_eq!(store.get_state(&rt).await.unwrap(), Value::Null);
    assert!(store.log_range(&rt, svc, 0).await.unwrap().is_empty());
    assert_eq!(store.get_state(&other).await.unwrap(), json!({"a": 1}));
}
