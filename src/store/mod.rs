// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod kube_store;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub use kube_store::KubeStore;

/// Identifies a namespaced object.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

pub type Labels = BTreeMap<String, String>;

/// The API error a store reports, following the reasons the API server puts in its
/// error responses. Transport failures that never reached the server are `Network`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiError {
    ObjectNotFound,
    ObjectAlreadyExists,
    Conflict,
    BadRequest,
    Invalid,
    InternalError,
    Timeout,
    ServerTimeout,
    TooManyRequests,
    Network,
    Other,
}

impl ApiError {
    /// Whether retrying the same request later can reasonably succeed.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ApiError::InternalError
                | ApiError::Timeout
                | ApiError::ServerTimeout
                | ApiError::TooManyRequests
                | ApiError::Network
        )
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct StoreError {
    pub kind: ApiError,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: ApiError, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ApiError::ObjectNotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == ApiError::ObjectAlreadyExists
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ApiError::Conflict
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// Typed access to one kind of namespaced object.
///
/// `update` and `update_status` are guarded by the object's resource version:
/// a stale version fails with `ApiError::Conflict`.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError>;

    async fn list(&self, namespace: &str, labels: &Labels) -> Result<Vec<K>, StoreError>;

    async fn create(&self, obj: &K) -> Result<K, StoreError>;

    async fn update(&self, obj: &K) -> Result<K, StoreError>;

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;

    async fn update_status(&self, obj: &K) -> Result<K, StoreError>;
}

/// Everything the guestbook reconciler reads and writes.
pub trait ResourceStore:
    ObjectStore<crate::crds::Guestbook>
    + ObjectStore<k8s_openapi::api::core::v1::ConfigMap>
    + ObjectStore<k8s_openapi::api::core::v1::Pod>
{
}

impl<S> ResourceStore for S where
    S: ObjectStore<crate::crds::Guestbook>
        + ObjectStore<k8s_openapi::api::core::v1::ConfigMap>
        + ObjectStore<k8s_openapi::api::core::v1::Pod>
{
}

/// Renders match labels the way the API server expects them in a label selector.
pub fn label_selector(labels: &Labels) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
