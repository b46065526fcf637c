// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::store::{ObjectKey, StoreError};
use std::fmt;
use thiserror::Error;

/// The step of a convergence pass an error happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    GetGuestbook,
    ReconcileConfigMap,
    ListPods,
    ScaleUp,
    ScaleDown,
    UpdateStatus,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Phase::GetGuestbook => "get guestbook",
            Phase::ReconcileConfigMap => "reconcile configmap",
            Phase::ListPods => "list pods",
            Phase::ScaleUp => "scale up",
            Phase::ScaleDown => "scale down",
            Phase::UpdateStatus => "update status",
        };
        f.write_str(phase)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("MissingObjectKey: {0}")]
    MissingObjectKey(&'static str),

    #[error("Failed to {phase} for {key}: {source}")]
    Reconcile {
        key: ObjectKey,
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("Guestbook {key} is invalid: {reason}")]
    InvalidSpec { key: ObjectKey, reason: String },

    #[error("Pod {pod} already exists and is not owned by guestbook {key}")]
    PodNameTaken { key: ObjectKey, pod: String },

    #[error("Failed to update status for {key}: still conflicting after {attempts} attempts")]
    StatusConflict { key: ObjectKey, attempts: u32 },
}

impl Error {
    pub fn reconcile(key: &ObjectKey, phase: Phase, source: StoreError) -> Self {
        Error::Reconcile {
            key: key.clone(),
            phase,
            source,
        }
    }

    /// Transient store failures end the pass with a requeue instead of an error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Reconcile { source, .. } if source.is_transient())
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::Reconcile { phase, .. } => Some(*phase),
            Error::StatusConflict { .. } => Some(Phase::UpdateStatus),
            Error::PodNameTaken { .. } => Some(Phase::ScaleUp),
            Error::MissingObjectKey(_) | Error::InvalidSpec { .. } => None,
        }
    }
}
