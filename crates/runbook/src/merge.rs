// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Combine the `workflow` blocks parsed from the main runbook file with
//! those found under the extra custom-code include path. A workflow name
//! may only be defined once across all sources put together; two files
//! naming the same workflow is a [`RunbookError::DuplicateWorkflow`].

use crate::descriptor::RawWorkflow;
use crate::error::RunbookError;
use indexmap::IndexMap;

pub fn merge_workflow_sources(sources: Vec<IndexMap<String, RawWorkflow>>) -> Result<IndexMap<String, RawWorkflow>, RunbookError> {
    let mut merged: IndexMap<String, RawWorkflow> = IndexMap::new();
    for source in sources {
        for (name, workflow) in source {
            if merged.insert(name.clone(), workflow).is_some() {
                return Err(RunbookError::DuplicateWorkflow(name));
            }
        }
    }
    Ok(merged)
}
