// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::device::{Device, DeviceId};

fn devices(n: usize) -> DeviceSet {
    (0..n).map(|i| Device::new(DeviceId::new(), format!("d{i}"))).collect()
}

#[test]
fn register_stores_the_device_set() {
    let reg = RunRegistry::new();
    let runtime = Runtime::from_string("r1");
    let set = devices(2);
    reg.register(runtime.clone(), set.clone(), None);
    assert_eq!(reg.targets(&runtime), Some(set));
}

#[test]
fn unregistered_runtime_has_no_targets_or_token() {
    let reg = RunRegistry::new();
    let runtime = Runtime::from_string("missing");
    assert!(reg.targets(&runtime).is_none());
    assert!(reg.stop_token(&runtime).is_none());
    assert!(!reg.is_stopped(&runtime));
}

#[test]
fn stop_cancels_the_runs_own_token() {
    let reg = RunRegistry::new();
    let runtime = Runtime::from_string("r1");
    reg.register(runtime.clone(), devices(1), None);
    assert!(!reg.is_stopped(&runtime));
    reg.stop(&runtime);
    assert!(reg.is_stopped(&runtime));
}

#[test]
fn child_token_is_cancelled_when_parent_is_stopped() {
    let reg = RunRegistry::new();
    let parent = Runtime::from_string("parent");
    let child = Runtime::from_string("child");
    reg.register(parent.clone(), devices(1), None);
    reg.register(child.clone(), devices(1), Some(&parent));

    assert!(!reg.is_stopped(&child));
    reg.stop(&parent);
    assert!(reg.is_stopped(&child));
}

#[test]
fn stopping_a_child_does_not_stop_its_parent() {
    let reg = RunRegistry::new();
    let parent = Runtime::from_string("parent");
    let child = Runtime::from_string("child");
    reg.register(parent.clone(), devices(1), None);
    reg.register(child.clone(), devices(1), Some(&parent));

    reg.stop(&child);
    assert!(reg.is_stopped(&child));
    assert!(!reg.is_stopped(&parent));
}

#[test]
fn finalize_removes_targets_and_stop_token() {
    let reg = RunRegistry::new();
    let runtime = Runtime::from_string("r1");
    reg.register(runtime.clone(), devices(1), None);
    reg.finalize(&runtime);
    assert!(reg.targets(&runtime).is_none());
    assert!(reg.stop_token(&runtime).is_none());
}
