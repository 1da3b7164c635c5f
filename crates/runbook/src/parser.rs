// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses a runbook document's HCL text into [`RawFile`] shapes, and
//! optionally extends it with fragments found under `paths.custom_code` —
//! an extra include path recursively scanned for `.hcl` files, merging in
//! every `workflow`/`service` block found.

use crate::descriptor::{RawFile, RawWorkflow};
use crate::error::RunbookError;
use crate::merge::merge_workflow_sources;
use indexmap::IndexMap;
use std::path::Path;

/// Parse one HCL document's text. `origin` is attached to any error for
/// operator-facing diagnostics (a file path, or a synthetic label for
/// in-memory sources).
pub fn parse_hcl(source: &str, origin: &str) -> Result<RawFile, RunbookError> {
    hcl::from_str(source).map_err(|e| RunbookError::Hcl { location: origin.to_string(), message: e.to_string() })
}

/// Parse the main runbook document plus every `.hcl` fragment found
/// (recursively) under `custom_code_dir`, and merge their `workflow` blocks
/// into one map. A workflow name defined in more than one source is a
/// [`RunbookError::DuplicateWorkflow`].
pub fn load_workflow_sources(main_source: &str, main_origin: &str, custom_code_dir: Option<&Path>) -> Result<IndexMap<String, RawWorkflow>, RunbookError> {
    let mut sources = vec![parse_hcl(main_source, main_origin)?.workflows];
    if let Some(dir) = custom_code_dir {
        for path in collect_hcl_files(dir)? {
            let text = std::fs::read_to_string(&path)?;
            let origin = path.display().to_string();
            tracing::debug!(path = %origin, "loading custom_code runbook fragment");
            sources.push(parse_hcl(&text, &origin)?.workflows);
        }
    }
    merge_workflow_sources(sources)
}

/// Recursively collect `.hcl` files under `dir`, sorted for deterministic
/// merge-order errors. Missing directories are treated as empty: an absent
/// `paths.custom_code` target is not an error.
fn collect_hcl_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, std::io::Error> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)?.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("hcl") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
