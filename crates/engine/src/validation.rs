// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validates one device result: extract the configured section of a device
//! result, optionally convert it, and compare against
//! `content_match`/`dict_match` to decide whether the validated flag should
//! override the raw per-device success.
//!
//! Design decision: `validation_condition` gates *when* validation runs
//! rather than only shaping how its result combines with the raw outcome —
//! `Success` validates only attempts that already reported success,
//! `Failure` only attempts that reported failure. This reading is the only
//! one consistent with the per-device retry contract: an attempt that
//! validation doesn't apply to must keep its raw outcome, since the last
//! outcome is always the one reported.

use regex::Regex;
use serde_json::Value;
use wfe_core::{EngineError, Validation, ValidationCondition, ValidationMethod};
use wfe_expr::{Bindings, Expr};

/// `Ok(None)` when validation is inactive or doesn't apply to this attempt's
/// raw outcome; `Ok(Some(validated))` when it ran and produced a verdict.
pub fn validate(validation: &Validation, raw_success: bool, result: &Value) -> Result<Option<bool>, EngineError> {
    let Some(condition) = validation.condition else { return Ok(None) };
    let applies = match condition {
        ValidationCondition::None => return Ok(None),
        ValidationCondition::Success => raw_success,
        ValidationCondition::Failure => !raw_success,
    };
    if !applies {
        return Ok(None);
    }

    let mut section = extract_section(validation, result)?;

    if validation.delete_spaces_before_matching {
        if let Value::String(s) = &section {
            section = Value::String(s.replace(' ', ""));
        }
    }

    if let Some(conversion) = &validation.conversion_method {
        section = evaluate_expr(conversion, section)?;
    }

    let matched = match validation.method {
        Some(ValidationMethod::Text) => text_match(validation, &section),
        Some(ValidationMethod::Dict) => {
            let pattern = validation.dict_match.clone().unwrap_or(Value::Null);
            is_subset(&pattern, &section)
        }
        None => false,
    };

    Ok(Some(if validation.negative_logic { !matched } else { matched }))
}

fn extract_section(validation: &Validation, result: &Value) -> Result<Value, EngineError> {
    match &validation.validation_section {
        Some(expr_src) => evaluate_expr(expr_src, result.clone()),
        None => Ok(result.clone()),
    }
}

/// Evaluate a validation-stage expression with the value under scrutiny
/// bound as `results` — the only variable these expressions need.
fn evaluate_expr(source: &str, results: Value) -> Result<Value, EngineError> {
    let expr = Expr::parse(source).map_err(|e| EngineError::UserCodeError(e.to_string()))?;
    let bindings = Bindings::new(Value::Null, Value::Null, Value::Null, results);
    expr.evaluate(&bindings).map_err(|e| EngineError::UserCodeError(e.to_string()))
}

fn text_match(validation: &Validation, section: &Value) -> bool {
    let text = match section {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let pattern = validation.content_match.as_deref().unwrap_or("");
    if validation.content_match_regex {
        Regex::new(pattern).map(|re| re.is_match(&text)).unwrap_or(false)
    } else {
        text.contains(pattern)
    }
}

/// Whether `pattern` is a sub-structure of `value`: every key in an object
/// pattern must be present with a matching (recursively sub-structural)
/// value; every element of an array pattern must match some element of the
/// corresponding array in `value`. Scalars compare by equality.
fn is_subset(pattern: &Value, value: &Value) -> bool {
    match (pattern, value) {
        (Value::Object(p), Value::Object(v)) => {
            p.iter().all(|(k, pv)| v.get(k).map(|vv| is_subset(pv, vv)).unwrap_or(false))
        }
        (Value::Array(p), Value::Array(v)) => p.iter().all(|pv| v.iter().any(|vv| is_subset(pv, vv))),
        _ => pattern == value,
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
