// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::admission::*;
use crate::crds::{GuestbookSpec, DEFAULT_PORT};

fn spec(size: i32, image: &str) -> GuestbookSpec {
    GuestbookSpec {
        size,
        image: image.to_string(),
        ..GuestbookSpec::default()
    }
}

#[test]
fn test_create_rejects_zero_size() {
    assert_eq!(
        validate_create(&spec(0, "x")),
        Err(AdmissionError("spec.size must be >= 1".to_string()))
    );
}

#[test]
fn test_create_rejects_empty_image() {
    assert_eq!(
        validate_create(&spec(1, "")),
        Err(AdmissionError("spec.image must be provided".to_string()))
    );
}

#[test]
fn test_create_accepts_valid_spec() {
    assert_eq!(validate_create(&spec(1, "nginx:latest")), Ok(()));
}

#[test]
fn test_update_only_checks_image() {
    let old = spec(3, "nginx:latest");
    assert_eq!(validate_update(&old, &spec(0, "nginx:1.27")), Ok(()));
    assert_eq!(
        validate_update(&old, &spec(3, "")),
        Err(AdmissionError("spec.image cannot be empty".to_string()))
    );
}

#[test]
fn test_delete_always_allowed() {
    assert_eq!(validate_delete(&spec(0, "")), Ok(()));
}

#[test]
fn test_defaults_fill_unset_fields() {
    let mut s = spec(0, "nginx:latest");
    default_spec(&mut s);
    assert_eq!(s.size, 1);
    assert_eq!(s.port, DEFAULT_PORT);
    assert_eq!(s.auth, Some(false));
    assert_eq!(validate_create(&s), Ok(()));
}

#[test]
fn test_defaults_keep_set_fields() {
    let mut s = GuestbookSpec {
        port: 9090,
        auth: Some(true),
        ..spec(4, "nginx:latest")
    };
    default_spec(&mut s);
    assert_eq!(s.size, 4);
    assert_eq!(s.port, 9090);
    assert_eq!(s.auth, Some(true));
}

#[test]
fn test_reconciler_gate_allows_zero_size() {
    assert_eq!(validate_state(&spec(0, "nginx:latest")), Ok(()));
    assert!(validate_state(&spec(2, "")).is_err());
}
