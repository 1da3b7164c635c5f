// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn get_is_none_for_an_unknown_key() {
    let kv = InProcessKvBackend::new();
    assert_eq!(kv.get("missing").await, None);
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let kv = InProcessKvBackend::new();
    kv.set("a", "1".to_string()).await;
    assert_eq!(kv.get("a").await, Some("1".to_string()));
}

#[tokio::test]
async fn mget_preserves_order_and_holes() {
    let kv = InProcessKvBackend::new();
    kv.set("a", "1".to_string()).await;
    kv.set("c", "3".to_string()).await;
    let values = kv.mget(&["a".to_string(), "b".to_string(), "c".to_string()]).await;
    assert_eq!(values, vec![Some("1".to_string()), None, Some("3".to_string())]);
}

#[tokio::test]
async fn keys_filters_by_prefix() {
    let kv = InProcessKvBackend::new();
    kv.set("state/r1/a", "1".to_string()).await;
    kv.set("state/r2/a", "1".to_string()).await;
    let mut keys = kv.keys("state/r1/").await;
    keys.sort();
    assert_eq!(keys, vec!["state/r1/a".to_string()]);
}

#[tokio::test]
async fn increment_starts_from_zero_and_accumulates() {
    let kv = InProcessKvBackend::new();
    assert_eq!(kv.increment("n", 5).await, 5);
    assert_eq!(kv.increment("n", -2).await, 3);
}

#[tokio::test]
async fn lpush_and_lrange_preserve_insertion_order() {
    let kv = InProcessKvBackend::new();
    kv.lpush("list", "a".to_string()).await;
    kv.lpush("list", "b".to_string()).await;
    assert_eq!(kv.lrange("list", 0).await, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(kv.lrange("list", 1).await, vec!["b".to_string()]);
}

#[tokio::test]
async fn delete_prefix_removes_scalars_and_lists() {
    let kv = InProcessKvBackend::new();
    kv.set("state/r1/a", "1".to_string()).await;
    kv.lpush("state/r1/list", "x".to_string()).await;
    kv.set("state/r2/a", "1".to_string()).await;

    kv.delete_prefix("state/r1/").await;

    assert_eq!(kv.get("state/r1/a").await, None);
    assert!(kv.lrange("state/r1/list", 0).await.is_empty());
    assert_eq!(kv.get("state/r2/a").await, Some("1".to_string()));
}
