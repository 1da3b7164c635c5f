// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use wfe_core::{Device, DeviceId};

fn device(name: &str) -> Device {
    Device::new(DeviceId::new(), name)
}

#[tokio::test]
async fn default_fake_driver_succeeds() {
    let driver = FakeDeviceDriver::new();
    let outcome = driver.run(&device("r1"), &json!({"cmd": "show version"})).await.unwrap();
    assert!(outcome.success);
}

#[tokio::test]
async fn always_fail_driver_fails_every_device() {
    let driver = FakeDeviceDriver::always_fail("bad credentials");
    let outcome = driver.run(&device("r1"), &Value::Null).await.unwrap();
    assert!(!outcome.success);
}

#[tokio::test]
async fn per_device_queue_is_consumed_in_order() {
    let driver = FakeDeviceDriver::new();
    driver.push_error("r1", DriverError::Transient("timeout".into()));
    driver.push_outcome("r1", DriverOutcome::success(json!("ok")));

    let d = device("r1");
    assert!(matches!(driver.run(&d, &Value::Null).await, Err(DriverError::Transient(_))));
    assert_eq!(driver.run(&d, &Value::Null).await.unwrap().result, json!("ok"));
    // queue exhausted, falls back to the default success.
    assert!(driver.run(&d, &Value::Null).await.unwrap().success);
}

#[tokio::test]
async fn calls_are_recorded_per_device() {
    let driver = FakeDeviceDriver::new();
    driver.run(&device("r1"), &json!({"a": 1})).await.unwrap();
    driver.run(&device("r2"), &json!({"a": 2})).await.unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].device_name, "r1");
    assert_eq!(calls[1].device_name, "r2");
}
