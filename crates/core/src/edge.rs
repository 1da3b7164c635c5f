// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edges connect services inside one workflow's graph.

use crate::service::ServiceId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies an [`Edge`]; used as the key for `edges/<id>` state writes.
    pub struct EdgeId("edg-");
}

/// Which outcome of the source service activates this edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSubtype {
    Success,
    Failure,
}

impl EdgeSubtype {
    pub fn from_success(success: bool) -> Self {
        if success {
            EdgeSubtype::Success
        } else {
            EdgeSubtype::Failure
        }
    }
}

/// `(source, destination, subtype, workflow)` is unique within one workflow
/// graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: ServiceId,
    pub destination: ServiceId,
    pub subtype: EdgeSubtype,
}

impl Edge {
    pub fn new(source: ServiceId, destination: ServiceId, subtype: EdgeSubtype) -> Self {
        Self { id: EdgeId::new(), source, destination, subtype }
    }
}
