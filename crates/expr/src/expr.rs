// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::bindings::Bindings;
use crate::error::ExprError;
use crate::value::{hcl_to_json, is_truthy, json_to_hcl};
use hcl::eval::{Context, Evaluate};
use serde_json::Value;
use std::str::FromStr;

/// A parsed, reusable expression. Parsing is separated from evaluation so a
/// service's `skip_query`/`iteration_values`/etc are parsed once when the
/// workflow is loaded and evaluated many times across devices and retries.
#[derive(Debug, Clone)]
pub struct Expr {
    source: String,
    parsed: hcl::Expression,
}

impl Expr {
    pub fn parse(source: impl Into<String>) -> Result<Self, ExprError> {
        let source = source.into();
        let parsed =
            hcl::Expression::from_str(&source).map_err(|e| ExprError::Parse(source.clone(), e.to_string()))?;
        Ok(Self { source, parsed })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the fixed `{payload, device, run, results}` variable
    /// set. No functions are declared in the evaluation context, so calling
    /// an arbitrary function name is a parse-time or evaluation-time error —
    /// this is the sandbox boundary.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<Value, ExprError> {
        let mut ctx = Context::new();
        ctx.declare_var("payload", json_to_hcl(&bindings.payload));
        ctx.declare_var("device", json_to_hcl(&bindings.device));
        ctx.declare_var("run", json_to_hcl(&bindings.run));
        ctx.declare_var("results", json_to_hcl(&bindings.results));

        let value = self
            .parsed
            .evaluate(&ctx)
            .map_err(|e| ExprError::Eval(self.source.clone(), e.to_string()))?;
        hcl_to_json(value)
    }

    /// Evaluate and coerce to a boolean via loose truthiness, for
    /// `skip_query` and validation content-match predicates.
    pub fn evaluate_truthy(&self, bindings: &Bindings) -> Result<bool, ExprError> {
        Ok(is_truthy(&self.evaluate(bindings)?))
    }

    /// Evaluate and require a JSON array, for `iteration_values` and
    /// `iteration_devices`.
    pub fn evaluate_sequence(&self, bindings: &Bindings) -> Result<Vec<Value>, ExprError> {
        match self.evaluate(bindings)? {
            Value::Array(items) => Ok(items),
            other => Err(ExprError::TypeMismatch(self.source.clone(), format!("expected an array, got {other}"))),
        }
    }
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
