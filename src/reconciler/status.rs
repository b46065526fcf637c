// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::{Guestbook, GuestbookStatus};
use crate::error::{Error, Phase};
use crate::settings::RetrySettings;
use crate::store::{ObjectKey, ObjectStore};
use k8s_openapi::api::core::v1::Pod;
use kube::api::ResourceExt;
use tracing::*;

/// The first pod (in list order) is active, the rest are standby.
/// Pods that are already being deleted are left out.
pub fn make_status(pods: &[Pod]) -> GuestbookStatus {
    let mut names = pods
        .iter()
        .filter(|pod| pod.metadata.deletion_timestamp.is_none())
        .map(|pod| pod.name_any());
    let active = names.next();
    GuestbookStatus {
        active,
        standby: names.collect(),
    }
}

/// Writes the status onto the latest version of the guestbook.
///
/// Every attempt re-reads the guestbook so that spec changes made since the pass
/// started are preserved. Conflicts are retried with exponential backoff, at most
/// `retry.max_attempts` times.
pub async fn publish_status<S>(
    store: &S,
    key: &ObjectKey,
    status: &GuestbookStatus,
    retry: &RetrySettings,
) -> Result<(), Error>
where
    S: ObjectStore<Guestbook> + ?Sized,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let mut latest = match store.get(key).await {
            Ok(gb) => gb,
            Err(e) if e.is_not_found() => {
                info!("Guestbook deleted before its status was updated");
                return Ok(());
            }
            Err(e) => return Err(Error::reconcile(key, Phase::UpdateStatus, e)),
        };
        if latest.status.as_ref() == Some(status) {
            debug!("Guestbook status up to date");
            return Ok(());
        }
        latest.status = Some(status.clone());
        match store.update_status(&latest).await {
            Ok(_) => {
                info!(active = ?status.active, standby = ?status.standby, "Guestbook status updated");
                return Ok(());
            }
            Err(e) if e.is_not_found() => {
                info!("Guestbook deleted before its status was updated");
                return Ok(());
            }
            Err(e) if e.is_conflict() => {
                if attempt >= max_attempts {
                    error!(attempts = attempt, "Failed to update Guestbook status after retries");
                    return Err(Error::StatusConflict {
                        key: key.clone(),
                        attempts: attempt,
                    });
                }
                let delay = retry.backoff(attempt);
                warn!(attempt, ?delay, "Status update conflicted, retrying on the latest version");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(Error::reconcile(key, Phase::UpdateStatus, e)),
        }
    }
}
