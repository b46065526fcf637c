// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::Guestbook;
use crate::store::Labels;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{Resource, ResourceExt};

pub fn guestbook_labels(gb: &Guestbook) -> Labels {
    Labels::from([("app".to_string(), gb.name_any())])
}

pub fn config_map_name(gb: &Guestbook) -> String {
    if gb.spec.config_map_name.is_empty() {
        gb.name_any() + "-config"
    } else {
        gb.spec.config_map_name.clone()
    }
}

pub fn pod_name(gb: &Guestbook, ordinal: usize) -> String {
    format!("{}-pod-{}", gb.name_any(), ordinal)
}

/// Recovers the ordinal from a worker pod name, if the name follows the
/// `<guestbook>-pod-<ordinal>` convention.
pub fn pod_ordinal(gb: &Guestbook, pod_name: &str) -> Option<usize> {
    let prefix = gb.name_any() + "-pod-";
    let suffix = pod_name.strip_prefix(prefix.as_str())?;
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Reject "01" and friends: only the canonical rendering maps back to an ordinal.
    if suffix.len() > 1 && suffix.starts_with('0') {
        return None;
    }
    suffix.parse().ok()
}

pub fn make_owner_references(gb: &Guestbook) -> Vec<OwnerReference> {
    gb.controller_owner_ref(&()).into_iter().collect()
}

/// Whether the object carries a controller owner reference pointing at this guestbook.
pub fn is_controlled_by<K: Resource>(obj: &K, gb: &Guestbook) -> bool {
    match gb.meta().uid.as_ref() {
        Some(uid) => obj
            .meta()
            .owner_references
            .as_ref()
            .map_or(false, |refs| {
                refs.iter()
                    .any(|r| &r.uid == uid && r.controller == Some(true))
            }),
        None => false,
    }
}
