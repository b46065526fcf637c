// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: i32 = 8080;

#[derive(CustomResource, Default, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "webapp.my.domain", version = "v1", kind = "Guestbook")]
#[kube(shortname = "gb", namespaced)]
#[kube(status = "GuestbookStatus")]
pub struct GuestbookSpec {
    #[serde(default)]
    pub size: i32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub port: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<bool>,
    #[serde(rename = "configMapName", default)]
    pub config_map_name: String,
    #[serde(rename = "jwtSecretName", default)]
    pub jwt_secret_name: String,
    #[serde(rename = "type", default)]
    #[schemars(with = "String")]
    pub guestbook_type: GuestbookType,
}

/// Selects which template is rendered into the guestbook ConfigMap.
/// Values the controller does not recognize deserialize to `Unknown`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum GuestbookType {
    Phone,
    Address,
    Name,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GuestbookStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standby: Vec<String>,
}

impl Default for Guestbook {
    fn default() -> Self {
        Self {
            metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta::default(),
            spec: GuestbookSpec::default(),
            status: None,
        }
    }
}

impl GuestbookSpec {
    /// Port passed to the workers; an unset port falls back to 8080.
    pub fn effective_port(&self) -> i32 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.unwrap_or(false)
    }
}
