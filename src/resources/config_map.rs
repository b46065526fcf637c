// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::{Guestbook, GuestbookType};
use crate::resources::common::*;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

pub const CONFIG_KEY: &str = "config.yaml";

/// Renders the guestbook configuration for the given type.
pub fn render_config(guestbook_type: GuestbookType) -> String {
    match guestbook_type {
        GuestbookType::Phone => "type: Phone\nnumber: 123-456-7890",
        GuestbookType::Address => "type: Address\nstreet: 123 Main St\ncity: Dhaka",
        GuestbookType::Name => "type: Name\nfirst: John\nlast: Doe",
        GuestbookType::Unknown => "type: Unknown",
    }
    .to_string()
}

pub fn make_config_map_data(gb: &Guestbook) -> BTreeMap<String, String> {
    BTreeMap::from([(
        CONFIG_KEY.to_string(),
        render_config(gb.spec.guestbook_type),
    )])
}

pub fn make_config_map(gb: &Guestbook) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(config_map_name(gb)),
            namespace: gb.metadata.namespace.clone(),
            labels: Some(guestbook_labels(gb)),
            owner_references: Some(make_owner_references(gb)),
            ..ObjectMeta::default()
        },
        data: Some(make_config_map_data(gb)),
        ..ConfigMap::default()
    }
}

/// Overwrites the content of an existing ConfigMap with the rendered one,
/// keeping its metadata (resource version included).
pub fn update_config_map(gb: &Guestbook, found: ConfigMap) -> ConfigMap {
    ConfigMap {
        data: Some(make_config_map_data(gb)),
        binary_data: None,
        ..found
    }
}

pub fn config_map_matches(gb: &Guestbook, found: &ConfigMap) -> bool {
    found.data.as_ref() == Some(&make_config_map_data(gb)) && found.binary_data.is_none()
}
