// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wfe-runbook: the operator-authored HCL definition format. Parses
//! `workflow "name" { service "name" { ... } }` documents — optionally
//! extended with fragments from `paths.custom_code` — and lowers them into
//! the `wfe_core::WorkflowGraph` arena the engine walks.

mod compile;
mod descriptor;
mod error;
mod merge;
mod parser;

pub use compile::compile_workflows;
pub use descriptor::{RawFile, RawService, RawWorkflow};
pub use error::RunbookError;
pub use parser::{load_workflow_sources, parse_hcl};

use indexmap::IndexMap;
use std::path::Path;
use wfe_core::WorkflowGraph;

/// Parse the main runbook document plus any `custom_code_dir` fragments and
/// compile the result straight into `WorkflowGraph`s, keyed by workflow
/// name. The one-call entry point most callers want.
pub fn load_workflows(main_source: &str, main_origin: &str, custom_code_dir: Option<&Path>) -> Result<IndexMap<String, WorkflowGraph>, RunbookError> {
    let raw = load_workflow_sources(main_source, main_origin, custom_code_dir)?;
    compile_workflows(&raw)
}
