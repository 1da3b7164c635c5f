// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opt-in escape hatch for operators who need more than the expression
//! language can express. Only reachable when `paths.custom_code` names an
//! include path in configuration — the default path never resolves a hook
//! and never shells out to an external interpreter.

use crate::bindings::Bindings;
use crate::error::ExprError;
use async_trait::async_trait;
use serde_json::Value;

/// A named Rust-trait-object hook, registered by the host process and
/// invoked by name from `preprocessing`/`postprocessing`/`skip_query`.
#[async_trait]
pub trait CustomCodeHook: Send + Sync {
    async fn call(&self, bindings: &Bindings) -> Result<Value, ExprError>;
}

/// Looks up hooks by the name an operator references them under in the
/// runbook (e.g. `custom_code("rotate_credentials")`).
#[derive(Default)]
pub struct HookRegistry {
    hooks: std::collections::HashMap<String, Box<dyn CustomCodeHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, hook: Box<dyn CustomCodeHook>) {
        self.hooks.insert(name.into(), hook);
    }

    pub async fn call(&self, name: &str, bindings: &Bindings) -> Result<Value, ExprError> {
        match self.hooks.get(name) {
            Some(hook) => {
                tracing::debug!(hook = name, "invoking custom_code hook");
                hook.call(bindings).await
            }
            None => Err(ExprError::UnknownHook(name.to_string())),
        }
    }
}
