// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::admission::validate_state;
use crate::crds::Guestbook;
use crate::error::{Error, Phase};
use crate::reconciler::status::{make_status, publish_status};
use crate::resources::{common::*, config_map::*, pod::*};
use crate::settings::ControllerSettings;
use crate::store::{ObjectKey, ObjectStore, ResourceStore};
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::api::{Resource, ResourceExt};
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;
use tracing::*;

/// How a convergence pass ended. Failures are reported as `Err(Error)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The pass stopped on a transient failure and should be retried later.
    Requeue(String),
    Cancelled,
}

pub struct GuestbookReconciler<S> {
    store: S,
    settings: ControllerSettings,
}

impl<S: ResourceStore> GuestbookReconciler<S> {
    pub fn new(store: S, settings: ControllerSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Runs one pass, abandoning it as soon as the token is cancelled.
    pub async fn reconcile_until_cancelled(
        &self,
        key: &ObjectKey,
        token: &CancellationToken,
    ) -> Result<Outcome, Error> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(guestbook = %key, "Reconcile cancelled");
                Ok(Outcome::Cancelled)
            }
            res = self.reconcile(key) => res,
        }
    }

    /// Runs one convergence pass for the guestbook identified by `key`.
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Outcome, Error> {
        let span = info_span!("reconcile", guestbook = %key);
        match self.reconcile_core(key).instrument(span).await {
            Ok(()) => Ok(Outcome::Done),
            Err(err) if err.is_transient() => {
                warn!(guestbook = %key, error = %err, "Reconcile stopped on a transient error, will retry");
                Ok(Outcome::Requeue(err.to_string()))
            }
            Err(err) => {
                error!(guestbook = %key, error = %err, "Reconcile failed");
                Err(err)
            }
        }
    }

    async fn reconcile_core(&self, key: &ObjectKey) -> Result<(), Error> {
        info!("Starting reconciliation");

        // Get the Guestbook custom resource before taking any reconciliation actions.
        let gb = match ObjectStore::<Guestbook>::get(&self.store, key).await {
            Ok(gb) => gb,
            Err(e) if e.is_not_found() => {
                info!("Guestbook not found, end reconcile");
                return Ok(());
            }
            Err(e) => return Err(Error::reconcile(key, Phase::GetGuestbook, e)),
        };
        if gb.meta().uid.is_none() {
            return Err(Error::MissingObjectKey(".metadata.uid"));
        }
        if gb.meta().deletion_timestamp.is_some() {
            info!("Guestbook is being deleted, leave its children to the garbage collector");
            return Ok(());
        }
        validate_state(&gb.spec).map_err(|e| Error::InvalidSpec {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        debug!(spec = ?gb.spec, "Guestbook fetched");

        self.reconcile_config_map(key, &gb).await?;

        let pods = self.list_pods(key, &gb).await?;
        let desired = usize::try_from(gb.spec.size).unwrap_or(0);
        let existing: BTreeSet<usize> = pods
            .iter()
            .filter_map(|pod| pod_ordinal(&gb, &pod.name_any()))
            .collect();
        info!(current = existing.len(), desired, "Checking pod count");

        // Status reflects the pods as they are after this pass scaled them.
        let pods = if existing.iter().copied().eq(0..desired) {
            pods
        } else {
            let created = self.scale_up(key, &gb, &existing, desired).await?;
            let deleted = self.scale_down(key, &gb, &existing, desired).await?;
            info!(created, deleted, "Scaled pods");
            self.list_pods(key, &gb).await?
        };
        let workers: Vec<Pod> = pods
            .into_iter()
            .filter(|pod| pod_ordinal(&gb, &pod.name_any()).is_some())
            .collect();
        let status = make_status(&workers);
        publish_status(&self.store, key, &status, &self.settings.status_retry).await?;

        info!("Reconciliation complete");
        Ok(())
    }

    async fn reconcile_config_map(&self, key: &ObjectKey, gb: &Guestbook) -> Result<(), Error> {
        let cm = make_config_map(gb);
        let cm_key = ObjectKey::new(key.namespace.clone(), config_map_name(gb));
        let to_err = |e| Error::reconcile(key, Phase::ReconcileConfigMap, e);

        match ObjectStore::<ConfigMap>::get(&self.store, &cm_key).await {
            Ok(found) => self.overwrite_config_map(key, gb, found).await,
            Err(e) if e.is_not_found() => {
                info!(configmap = %cm_key.name, "Create configmap");
                match ObjectStore::<ConfigMap>::create(&self.store, &cm).await {
                    Ok(_) => Ok(()),
                    Err(e) if e.is_already_exists() => {
                        info!(configmap = %cm_key.name, "Configmap appeared concurrently, compare its content");
                        let found = ObjectStore::<ConfigMap>::get(&self.store, &cm_key)
                            .await
                            .map_err(to_err)?;
                        self.overwrite_config_map(key, gb, found).await
                    }
                    Err(e) => Err(to_err(e)),
                }
            }
            Err(e) => Err(to_err(e)),
        }
    }

    async fn overwrite_config_map(
        &self,
        key: &ObjectKey,
        gb: &Guestbook,
        found: ConfigMap,
    ) -> Result<(), Error> {
        let cm_name = found.name_any();
        if config_map_matches(gb, &found) {
            debug!(configmap = %cm_name, "Configmap up to date");
            return Ok(());
        }
        info!(
            configmap = %cm_name,
            resource_version = ?found.metadata.resource_version,
            "Update configmap"
        );
        ObjectStore::<ConfigMap>::update(&self.store, &update_config_map(gb, found))
            .await
            .map(|_| ())
            .map_err(|e| Error::reconcile(key, Phase::ReconcileConfigMap, e))
    }

    async fn list_pods(&self, key: &ObjectKey, gb: &Guestbook) -> Result<Vec<Pod>, Error> {
        let labels = guestbook_labels(gb);
        let pods = ObjectStore::<Pod>::list(&self.store, &key.namespace, &labels)
            .await
            .map_err(|e| Error::reconcile(key, Phase::ListPods, e))?;
        debug!(count = pods.len(), "Found pods");
        Ok(pods)
    }

    /// Creates every missing ordinal below `desired`, lowest first.
    async fn scale_up(
        &self,
        key: &ObjectKey,
        gb: &Guestbook,
        existing: &BTreeSet<usize>,
        desired: usize,
    ) -> Result<usize, Error> {
        let mut created = 0;
        for ordinal in (0..desired).filter(|ordinal| !existing.contains(ordinal)) {
            let pod = make_pod(gb, ordinal);
            let name = pod_name(gb, ordinal);
            info!(pod = %name, ordinal, "Create pod");
            match ObjectStore::<Pod>::create(&self.store, &pod).await {
                Ok(_) => created += 1,
                Err(e) if e.is_already_exists() => {
                    let pod_key = ObjectKey::new(key.namespace.clone(), name.clone());
                    let found = ObjectStore::<Pod>::get(&self.store, &pod_key)
                        .await
                        .map_err(|e| Error::reconcile(key, Phase::ScaleUp, e))?;
                    if !is_controlled_by(&found, gb) {
                        return Err(Error::PodNameTaken {
                            key: key.clone(),
                            pod: name,
                        });
                    }
                    info!(pod = %name, "Pod already exists, skipping creation");
                }
                Err(e) => {
                    error!(pod = %name, error = %e, "Failed to create pod");
                    return Err(Error::reconcile(key, Phase::ScaleUp, e));
                }
            }
        }
        Ok(created)
    }

    /// Deletes every listed ordinal at or above `desired`, lowest first.
    async fn scale_down(
        &self,
        key: &ObjectKey,
        gb: &Guestbook,
        existing: &BTreeSet<usize>,
        desired: usize,
    ) -> Result<usize, Error> {
        let mut deleted = 0;
        for &ordinal in existing.range(desired..) {
            let name = pod_name(gb, ordinal);
            let pod_key = ObjectKey::new(key.namespace.clone(), name.clone());
            info!(pod = %name, ordinal, "Delete pod");
            match ObjectStore::<Pod>::delete(&self.store, &pod_key).await {
                Ok(()) => deleted += 1,
                Err(e) if e.is_not_found() => {
                    info!(pod = %name, "Pod not found, skipping deletion");
                }
                Err(e) => {
                    error!(pod = %name, error = %e, "Failed to delete pod");
                    return Err(Error::reconcile(key, Phase::ScaleDown, e));
                }
            }
        }
        Ok(deleted)
    }
}
