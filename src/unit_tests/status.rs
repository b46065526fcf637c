// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use super::fake_cluster::{FakeCluster, Op};
use super::*;
use crate::crds::GuestbookStatus;
use crate::error::Phase;
use crate::reconciler::status::{make_status, publish_status};
use crate::store::ApiError;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

fn named_pod(name: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..ObjectMeta::default()
        },
        ..Pod::default()
    }
}

fn sample_status() -> GuestbookStatus {
    GuestbookStatus {
        active: Some("gb-pod-0".to_string()),
        standby: vec!["gb-pod-1".to_string()],
    }
}

#[test]
fn test_first_pod_is_active() {
    let pods = vec![named_pod("p0"), named_pod("p1"), named_pod("p2")];
    assert_eq!(
        make_status(&pods),
        GuestbookStatus {
            active: Some("p0".to_string()),
            standby: vec!["p1".to_string(), "p2".to_string()],
        }
    );
}

#[test]
fn test_no_pods_no_active() {
    assert_eq!(make_status(&[]), GuestbookStatus::default());
}

#[test]
fn test_terminating_pods_are_skipped() {
    let mut terminating = named_pod("p0");
    terminating.metadata.deletion_timestamp = Some(Time(k8s_openapi::chrono::Utc::now()));
    let pods = vec![terminating, named_pod("p1"), named_pod("p2")];
    assert_eq!(
        make_status(&pods),
        GuestbookStatus {
            active: Some("p1".to_string()),
            standby: vec!["p2".to_string()],
        }
    );
}

#[tokio::test]
async fn test_unchanged_status_is_not_written() {
    let cluster = FakeCluster::default();
    let mut gb = make_guestbook(2, GuestbookType::Phone);
    gb.status = Some(sample_status());
    cluster.guestbooks.put(gb);

    publish_status(&cluster, &guestbook_key(), &sample_status(), &test_settings().status_retry)
        .await
        .unwrap();
    assert_eq!(cluster.writes(), 0);
}

#[tokio::test]
async fn test_status_write_leaves_spec_untouched() {
    let cluster = FakeCluster::default();
    cluster.guestbooks.put(make_guestbook(2, GuestbookType::Phone));

    publish_status(&cluster, &guestbook_key(), &sample_status(), &test_settings().status_retry)
        .await
        .unwrap();
    let gb = cluster.guestbooks.object(&guestbook_key()).unwrap();
    assert_eq!(gb.status, Some(sample_status()));
    assert_eq!(gb.spec, make_guestbook(2, GuestbookType::Phone).spec);
    assert_eq!(cluster.guestbooks.writes(), 1);
}

#[tokio::test]
async fn test_vanished_guestbook_is_not_an_error() {
    let cluster = FakeCluster::default();
    cluster.guestbooks.put(make_guestbook(2, GuestbookType::Phone));
    cluster.guestbooks.before_next(Op::UpdateStatus, |state| {
        state.remove(&guestbook_key());
    });

    publish_status(&cluster, &guestbook_key(), &sample_status(), &test_settings().status_retry)
        .await
        .unwrap();
    assert_eq!(cluster.writes(), 0);

    let cluster = FakeCluster::default();
    publish_status(&cluster, &guestbook_key(), &sample_status(), &test_settings().status_retry)
        .await
        .unwrap();
    assert_eq!(cluster.writes(), 0);
}

#[tokio::test]
async fn test_non_conflict_failure_is_not_retried() {
    let cluster = FakeCluster::default();
    cluster.guestbooks.put(make_guestbook(2, GuestbookType::Phone));
    cluster
        .guestbooks
        .fail_next(Op::UpdateStatus, ApiError::InternalError);

    let err = publish_status(
        &cluster,
        &guestbook_key(),
        &sample_status(),
        &test_settings().status_retry,
    )
    .await
    .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.phase(), Some(Phase::UpdateStatus));
    assert_eq!(cluster.guestbooks.writes(), 0);
}
