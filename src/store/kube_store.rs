// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::store::{label_selector, ApiError, Labels, ObjectKey, ObjectStore, StoreError};
use async_trait::async_trait;
use core::fmt::Debug;
use kube::{
    api::{Api, DeleteParams, ListParams, PostParams, Resource},
    core::NamespaceResourceScope,
    Client,
};
use serde::{de::DeserializeOwned, Serialize};

/// ObjectStore backed by the Kubernetes API server through kube-rs.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
        Api::<K>::namespaced(self.client.clone(), namespace)
    }
}

fn object_key<K: Resource>(obj: &K) -> Result<ObjectKey, StoreError> {
    let name = obj
        .meta()
        .name
        .as_ref()
        .ok_or_else(|| StoreError::new(ApiError::Invalid, "object misses \".metadata.name\""))?;
    let namespace = obj.meta().namespace.as_ref().ok_or_else(|| {
        StoreError::new(ApiError::Invalid, "object misses \".metadata.namespace\"")
    })?;
    Ok(ObjectKey::new(namespace.clone(), name.clone()))
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError> {
        self.api::<K>(&key.namespace)
            .get(&key.name)
            .await
            .map_err(|e| kube_error_to_store_error(&e))
    }

    async fn list(&self, namespace: &str, labels: &Labels) -> Result<Vec<K>, StoreError> {
        let lp = ListParams::default().labels(&label_selector(labels));
        let list = self
            .api::<K>(namespace)
            .list(&lp)
            .await
            .map_err(|e| kube_error_to_store_error(&e))?;
        Ok(list.items)
    }

    async fn create(&self, obj: &K) -> Result<K, StoreError> {
        let key = object_key(obj)?;
        self.api::<K>(&key.namespace)
            .create(&PostParams::default(), obj)
            .await
            .map_err(|e| kube_error_to_store_error(&e))
    }

    async fn update(&self, obj: &K) -> Result<K, StoreError> {
        let key = object_key(obj)?;
        self.api::<K>(&key.namespace)
            .replace(&key.name, &PostParams::default(), obj)
            .await
            .map_err(|e| kube_error_to_store_error(&e))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        self.api::<K>(&key.namespace)
            .delete(&key.name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| kube_error_to_store_error(&e))
    }

    async fn update_status(&self, obj: &K) -> Result<K, StoreError> {
        let key = object_key(obj)?;
        let data = serde_json::to_vec(obj)
            .map_err(|e| StoreError::new(ApiError::BadRequest, e.to_string()))?;
        self.api::<K>(&key.namespace)
            .replace_status(&key.name, &PostParams::default(), data)
            .await
            .map_err(|e| kube_error_to_store_error(&e))
    }
}

pub fn kube_error_to_api_error(error: &kube::Error) -> ApiError {
    match error {
        kube::Error::Api(error_resp) => match error_resp.reason.as_str() {
            "NotFound" => ApiError::ObjectNotFound,
            "AlreadyExists" => ApiError::ObjectAlreadyExists,
            "Conflict" => ApiError::Conflict,
            "BadRequest" => ApiError::BadRequest,
            "Invalid" => ApiError::Invalid,
            "InternalError" => ApiError::InternalError,
            "Timeout" => ApiError::Timeout,
            "ServerTimeout" => ApiError::ServerTimeout,
            "TooManyRequests" => ApiError::TooManyRequests,
            _ if error_resp.code == 429 => ApiError::TooManyRequests,
            _ => ApiError::Other,
        },
        kube::Error::HyperError(_) | kube::Error::Service(_) => ApiError::Network,
        _ => ApiError::Other,
    }
}

pub fn kube_error_to_store_error(error: &kube::Error) -> StoreError {
    StoreError::new(kube_error_to_api_error(error), error.to_string())
}
