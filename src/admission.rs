// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
//! Admission-time defaulting and validation for Guestbook objects.
//!
//! These are the checks every Guestbook has passed before the reconciler sees it.
//! The reconciler runs the weaker [`validate_state`] before acting on a spec.
use crate::crds::{GuestbookSpec, DEFAULT_PORT};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct AdmissionError(pub String);

pub fn default_spec(spec: &mut GuestbookSpec) {
    if spec.size < 1 {
        spec.size = 1;
    }
    if spec.port == 0 {
        spec.port = DEFAULT_PORT;
    }
    if spec.auth.is_none() {
        spec.auth = Some(false);
    }
}

pub fn validate_create(spec: &GuestbookSpec) -> Result<(), AdmissionError> {
    if spec.size < 1 {
        return Err(AdmissionError("spec.size must be >= 1".to_string()));
    }
    if spec.image.is_empty() {
        return Err(AdmissionError("spec.image must be provided".to_string()));
    }
    Ok(())
}

pub fn validate_update(_old: &GuestbookSpec, new: &GuestbookSpec) -> Result<(), AdmissionError> {
    if new.image.is_empty() {
        return Err(AdmissionError("spec.image cannot be empty".to_string()));
    }
    Ok(())
}

pub fn validate_delete(_spec: &GuestbookSpec) -> Result<(), AdmissionError> {
    Ok(())
}

/// What a spec must satisfy before the reconciler acts on it.
///
/// A size below one is not refused here: the reconciler converges it to zero pods.
pub fn validate_state(spec: &GuestbookSpec) -> Result<(), AdmissionError> {
    if spec.image.is_empty() {
        return Err(AdmissionError("spec.image must be provided".to_string()));
    }
    Ok(())
}
