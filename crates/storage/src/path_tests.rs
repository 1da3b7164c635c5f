// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn set_creates_intermediate_objects() {
    let mut root = Value::Null;
    set(&mut root, "progress/service/abc/device/success", json!(0)).unwrap();
    assert_eq!(get(&root, "progress/service/abc/device/success"), Some(&json!(0)));
}

#[test]
fn set_overwrites_existing_value() {
    let mut root = Value::Null;
    set(&mut root, "a/b", json!("first")).unwrap();
    set(&mut root, "a/b", json!("second")).unwrap();
    assert_eq!(get(&root, "a/b"), Some(&json!("second")));
}

#[test]
fn increment_starts_from_zero_when_absent() {
    let mut root = Value::Null;
    let v = increment(&mut root, "progress/service/success", 1).unwrap();
    assert_eq!(v, 1);
    let v = increment(&mut root, "progress/service/success", 3).unwrap();
    assert_eq!(v, 4);
}

#[test]
fn increment_rejects_a_non_numeric_existing_value() {
    let mut root = Value::Null;
    set(&mut root, "a", json!("not a number")).unwrap();
    assert!(increment(&mut root, "a", 1).is_err());
}

#[test]
fn append_creates_the_array_on_first_write() {
    let mut root = Value::Null;
    append(&mut root, "edges/e1", json!("DONE")).unwrap();
    assert_eq!(get(&root, "edges/e1"), Some(&json!(["DONE"])));
}

#[test]
fn append_pushes_onto_an_existing_array() {
    let mut root = Value::Null;
    append(&mut root, "logs", json!("line 1")).unwrap();
    append(&mut root, "logs", json!("line 2")).unwrap();
    assert_eq!(get(&root, "logs"), Some(&json!(["line 1", "line 2"])));
}

#[test]
fn append_rejects_a_non_array_existing_value() {
    let mut root = Value::Null;
    set(&mut root, "a", json!(1)).unwrap();
    assert!(append(&mut root, "a", json!(2)).is_err());
}

#[test]
fn get_returns_none_for_an_unknown_path() {
    let root = json!({"a": {"b": 1}});
    assert_eq!(get(&root, "a/c"), None);
    assert_eq!(get(&root, "x/y/z"), None);
}
