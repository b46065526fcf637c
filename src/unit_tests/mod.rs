// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod admission;
pub mod status;

use crate::crds::{Guestbook, GuestbookSpec, GuestbookType};
use crate::reconciler::GuestbookReconciler;
use crate::settings::{ControllerSettings, RetrySettings};
use crate::store::ObjectKey;
use fake_cluster::FakeCluster;
use kube::api::ObjectMeta;
use std::time::Duration;

pub const NAMESPACE: &str = "default";
pub const NAME: &str = "gb";

pub fn guestbook_key() -> ObjectKey {
    ObjectKey::new(NAMESPACE, NAME)
}

pub fn make_guestbook(size: i32, guestbook_type: GuestbookType) -> Guestbook {
    Guestbook {
        metadata: ObjectMeta {
            name: Some(NAME.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..ObjectMeta::default()
        },
        spec: GuestbookSpec {
            size,
            image: "nginx:latest".to_string(),
            port: 8080,
            auth: Some(true),
            config_map_name: "gb-config".to_string(),
            jwt_secret_name: "gb-jwt".to_string(),
            guestbook_type,
        },
        status: None,
    }
}

pub fn test_settings() -> ControllerSettings {
    ControllerSettings {
        status_retry: RetrySettings {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        },
        ..ControllerSettings::default()
    }
}

/// A reconciler over an empty fake cluster holding only `gb`.
pub fn reconciler_with(gb: Guestbook) -> GuestbookReconciler<FakeCluster> {
    let cluster = FakeCluster::default();
    cluster.guestbooks.put(gb);
    GuestbookReconciler::new(cluster, test_settings())
}

pub fn object_key(name: &str) -> ObjectKey {
    ObjectKey::new(NAMESPACE, name)
}
