// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::Guestbook;
use crate::resources::common::*;
use k8s_openapi::api::core::v1 as corev1;
use kube::api::ObjectMeta;

pub const CONTAINER_NAME: &str = "guestbook";
pub const CONFIG_VOLUME_NAME: &str = "guestbook-config";
pub const CONFIG_MOUNT_PATH: &str = "/etc/guestbook";
pub const JWT_SECRET_KEY: &str = "JWT_SECRET";

pub fn make_pod_args(gb: &Guestbook) -> Vec<String> {
    vec![
        format!("--port={}", gb.spec.effective_port()),
        format!("--auth={}", gb.spec.auth_enabled()),
    ]
}

pub fn make_pod(gb: &Guestbook, ordinal: usize) -> corev1::Pod {
    corev1::Pod {
        metadata: ObjectMeta {
            name: Some(pod_name(gb, ordinal)),
            namespace: gb.metadata.namespace.clone(),
            labels: Some(guestbook_labels(gb)),
            owner_references: Some(make_owner_references(gb)),
            ..ObjectMeta::default()
        },
        spec: Some(make_pod_spec(gb)),
        ..corev1::Pod::default()
    }
}

fn make_pod_spec(gb: &Guestbook) -> corev1::PodSpec {
    corev1::PodSpec {
        containers: vec![corev1::Container {
            name: CONTAINER_NAME.to_string(),
            image: Some(gb.spec.image.clone()),
            command: Some(vec!["./main".to_string(), "startProject".to_string()]),
            args: Some(make_pod_args(gb)),
            env: make_env(gb),
            volume_mounts: Some(vec![corev1::VolumeMount {
                name: CONFIG_VOLUME_NAME.to_string(),
                mount_path: CONFIG_MOUNT_PATH.to_string(),
                ..corev1::VolumeMount::default()
            }]),
            ..corev1::Container::default()
        }],
        volumes: Some(vec![corev1::Volume {
            name: CONFIG_VOLUME_NAME.to_string(),
            config_map: Some(corev1::ConfigMapVolumeSource {
                name: Some(config_map_name(gb)),
                ..corev1::ConfigMapVolumeSource::default()
            }),
            ..corev1::Volume::default()
        }]),
        ..corev1::PodSpec::default()
    }
}

fn make_env(gb: &Guestbook) -> Option<Vec<corev1::EnvVar>> {
    if gb.spec.jwt_secret_name.is_empty() {
        return None;
    }
    Some(vec![corev1::EnvVar {
        name: JWT_SECRET_KEY.to_string(),
        value_from: Some(corev1::EnvVarSource {
            secret_key_ref: Some(corev1::SecretKeySelector {
                name: Some(gb.spec.jwt_secret_name.clone()),
                key: JWT_SECRET_KEY.to_string(),
                ..corev1::SecretKeySelector::default()
            }),
            ..corev1::EnvVarSource::default()
        }),
        ..corev1::EnvVar::default()
    }])
}
