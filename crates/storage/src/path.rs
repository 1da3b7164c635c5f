// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Addressable `"progress/service/<id>/device/success"`-style paths into the
//! state tree, and the tree-navigation helpers both backends build `set`,
//! `increment`, and `append` on top of.

use crate::error::StorageError;
use serde_json::{Map, Value};

pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn descend<'a>(root: &'a mut Value, segments: &[&str]) -> Result<&'a mut Map<String, Value>, StorageError> {
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    let mut current = root.as_object_mut().ok_or(StorageError::NotAnObject)?;
    for seg in segments {
        let entry = current.entry(seg.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry.as_object_mut().ok_or(StorageError::NotAnObject)?;
    }
    Ok(current)
}

pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        return Some(root);
    };
    let mut current = root;
    for seg in parents {
        current = current.as_object()?.get(*seg)?;
    }
    current.as_object()?.get(*last)
}

pub fn set(root: &mut Value, path: &str, value: Value) -> Result<(), StorageError> {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        *root = value;
        return Ok(());
    };
    let container = descend(root, parents)?;
    container.insert(last.to_string(), value);
    Ok(())
}

pub fn increment(root: &mut Value, path: &str, by: i64) -> Result<i64, StorageError> {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        return Err(StorageError::NotANumber { path: path.to_string() });
    };
    let container = descend(root, parents)?;
    let current = match container.get(*last) {
        None => 0,
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| StorageError::NotANumber { path: path.to_string() })?,
        Some(_) => return Err(StorageError::NotANumber { path: path.to_string() }),
    };
    let updated = current + by;
    container.insert(last.to_string(), Value::from(updated));
    Ok(updated)
}

pub fn append(root: &mut Value, path: &str, value: Value) -> Result<(), StorageError> {
    let segs = segments(path);
    let Some((last, parents)) = segs.split_last() else {
        return Err(StorageError::NotAContainer { op: "append", path: path.to_string() });
    };
    let container = descend(root, parents)?;
    match container.get_mut(*last) {
        Some(Value::Array(items)) => {
            items.push(value);
        }
        None => {
            container.insert(last.to_string(), Value::Array(vec![value]));
        }
        Some(_) => return Err(StorageError::NotAContainer { op: "append", path: path.to_string() }),
    }
    Ok(())
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
