// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunbookError {
    #[error("{location}: {message}")]
    Hcl { location: String, message: String },
    #[error("workflow {workflow:?} references unknown service {name:?}")]
    UnknownService { workflow: String, name: String },
    #[error("workflow {0:?} is defined more than once across the runbook sources")]
    DuplicateWorkflow(String),
    #[error("service {service:?} in workflow {workflow:?} references undefined workflow {target:?}")]
    UnknownWorkflowReference { workflow: String, service: String, target: String },
    #[error("workflow {0:?} nests into itself, directly or transitively")]
    Cycle(String),
    #[error("workflow {workflow:?} service {service:?} field {field:?} has invalid value {value:?}")]
    InvalidEnumValue { workflow: String, service: String, field: String, value: String },
    #[error("{0}")]
    InvalidGraph(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
