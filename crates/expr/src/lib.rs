// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Sandboxed expression evaluation for `skip_query`, `iteration_values`,
//! `iteration_devices`, `validation_section`, and `preprocessing`/
//! `postprocessing`. Expressions are parsed once and evaluated over a fixed
//! variable set — nothing in the host process is reachable from them.

mod bindings;
mod error;
mod expr;
mod hooks;
mod value;

pub use bindings::Bindings;
pub use error::ExprError;
pub use expr::Expr;
pub use hooks::{CustomCodeHook, HookRegistry};

use wfe_core::{Device, DeviceId, DeviceSet};

/// Evaluate `iteration_devices` into a [`DeviceSet`]. The expression must
/// produce an array of objects shaped `{id, name, properties}`; `id` and
/// `properties` are optional, a missing `id` gets a fresh one assigned.
pub fn evaluate_device_set(expr: &Expr, bindings: &Bindings) -> Result<DeviceSet, ExprError> {
    let items = expr.evaluate_sequence(bindings)?;
    let mut set = DeviceSet::new();
    for item in items {
        let obj = item.as_object().ok_or_else(|| {
            ExprError::TypeMismatch(expr.source().to_string(), format!("expected a device object, got {item}"))
        })?;
        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ExprError::TypeMismatch(expr.source().to_string(), "device object missing a `name` field".into())
            })?
            .to_string();
        let mut device = Device::new(DeviceId::new(), name);
        if let Some(serde_json::Value::Object(props)) = obj.get("properties") {
            for (k, v) in props {
                if let Some(s) = v.as_str() {
                    device = device.property(k.clone(), s.to_string());
                }
            }
        }
        set.insert(device);
    }
    Ok(set)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
