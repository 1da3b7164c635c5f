// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversion between `serde_json::Value`, the wire/payload representation
//! used everywhere else in the workspace, and `hcl::Value`, the value type
//! the expression evaluator works in.

use crate::error::ExprError;

pub fn json_to_hcl(value: &serde_json::Value) -> hcl::Value {
    match value {
        serde_json::Value::Null => hcl::Value::Null,
        serde_json::Value::Bool(b) => hcl::Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                hcl::Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                hcl::Value::Number(u.into())
            } else {
                hcl::Value::Number(hcl::Number::from_f64(n.as_f64().unwrap_or(0.0)).unwrap_or_else(|| 0.into()))
            }
        }
        serde_json::Value::String(s) => hcl::Value::String(s.clone()),
        serde_json::Value::Array(items) => hcl::Value::Array(items.iter().map(json_to_hcl).collect()),
        serde_json::Value::Object(map) => {
            hcl::Value::Object(map.iter().map(|(k, v)| (k.clone(), json_to_hcl(v))).collect())
        }
    }
}

pub fn hcl_to_json(value: hcl::Value) -> Result<serde_json::Value, ExprError> {
    Ok(match value {
        hcl::Value::Null => serde_json::Value::Null,
        hcl::Value::Bool(b) => serde_json::Value::Bool(b),
        hcl::Value::Number(n) => {
            let json_number = if let Some(i) = n.as_i64() {
                serde_json::Number::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Number::from(u)
            } else {
                serde_json::Number::from_f64(n.as_f64().ok_or_else(|| {
                    ExprError::TypeMismatch("number".into(), "not representable as f64".into())
                })?)
                .ok_or_else(|| ExprError::TypeMismatch("number".into(), "not a finite f64".into()))?
            };
            serde_json::Value::Number(json_number)
        }
        hcl::Value::String(s) => serde_json::Value::String(s),
        hcl::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(hcl_to_json).collect::<Result<_, _>>()?)
        }
        hcl::Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k, hcl_to_json(v)?);
            }
            serde_json::Value::Object(out)
        }
    })
}

/// HCL has no `undefined`/`NaN` distinction; treat anything but `null`,
/// `false`, and the empty string as truthy, matching the loose truthiness
/// rule a `skip_query` or validation expression relies on.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
    }
}
