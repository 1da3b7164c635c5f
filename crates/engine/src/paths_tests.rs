// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn progress_service_paths_match_the_canonical_grammar() {
    assert_eq!(progress_service_success(), "progress/service/success");
    assert_eq!(progress_service_failure(), "progress/service/failure");
}

#[test]
fn device_progress_path_embeds_service_id_and_bucket() {
    let service = ServiceId::new();
    let path = progress_service_device(service, "success");
    assert_eq!(path, format!("progress/service/{service}/device/success"));
}

#[test]
fn edge_path_embeds_edge_id() {
    let edge_id = EdgeId::new();
    assert_eq!(edge(edge_id), format!("edges/{edge_id}"));
}
