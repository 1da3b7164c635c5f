// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn empty_bindings() -> Bindings {
    Bindings::default()
}

#[test]
fn evaluate_device_set_builds_devices_from_array_literal() {
    let expr = Expr::parse(
        r#"[
            { name = "edge-01", properties = { vendor = "cisco" } },
            { name = "edge-02" },
        ]"#,
    )
    .unwrap();
    let set = evaluate_device_set(&expr, &empty_bindings()).unwrap();
    assert_eq!(set.len(), 2);
    let names: Vec<&str> = set.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["edge-01", "edge-02"]);
    let first = set.iter().find(|d| d.name == "edge-01").unwrap();
    assert_eq!(first.properties.get("vendor").map(String::as_str), Some("cisco"));
}

#[test]
fn evaluate_device_set_requires_a_name_field() {
    let expr = Expr::parse(r#"[{ id = "dev-x" }]"#).unwrap();
    assert!(evaluate_device_set(&expr, &empty_bindings()).is_err());
}

#[test]
fn evaluate_device_set_requires_an_array_result() {
    let expr = Expr::parse(r#"{ name = "edge-01" }"#).unwrap();
    assert!(evaluate_device_set(&expr, &empty_bindings()).is_err());
}
