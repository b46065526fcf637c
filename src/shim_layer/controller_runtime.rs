// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::crds::Guestbook;
use crate::error::Error;
use crate::reconciler::{GuestbookReconciler, Outcome};
use crate::settings::ControllerSettings;
use crate::store::{KubeStore, ObjectKey};
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::{
    api::{Api, Resource},
    core::NamespaceResourceScope,
    runtime::{
        controller::{self, Action, Controller},
        reflector::ObjectRef,
        watcher,
    },
    Client,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::*;

// The shim layer connects the guestbook reconciler to the kube-rs controller runtime.
// kube-rs runs at most one reconcile per guestbook at a time, and every trigger ends up
// in one call to GuestbookReconciler::reconcile_until_cancelled.

// Data is passed to reconcile and error_policy.
pub struct Data {
    pub reconciler: GuestbookReconciler<KubeStore>,
    // Cancelled on shutdown so that in-flight passes stop early.
    pub shutdown: CancellationToken,
}

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
{
    match namespace {
        Some(ns) => Api::<K>::namespaced(client.clone(), ns),
        None => Api::<K>::all(client.clone()),
    }
}

// run_controller watches Guestbooks together with the Pods and ConfigMaps they own,
// and runs until the process receives a shutdown signal.
pub async fn run_controller(client: Client, settings: ControllerSettings) -> Result<()> {
    let namespace = settings.namespace.clone();
    let guestbooks = scoped_api::<Guestbook>(&client, namespace.as_deref());
    let pods = scoped_api::<Pod>(&client, namespace.as_deref());
    let config_maps = scoped_api::<ConfigMap>(&client, namespace.as_deref());

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received, cancelling in-flight reconciles");
                signal_token.cancel();
            }
            Err(e) => warn!("unable to listen for shutdown signal: {}", e),
        }
    });

    let data = Arc::new(Data {
        reconciler: GuestbookReconciler::new(KubeStore::new(client), settings),
        shutdown,
    });

    info!(namespace = ?namespace, "starting guestbook-controller");
    Controller::new(guestbooks, watcher::Config::default())
        .owns(pods, watcher::Config::default())
        .owns(config_maps, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, data)
        .for_each(|res| async move {
            report_controller_reconciled("guestbook-controller", &res);
        })
        .await;
    info!("controller terminated");
    Ok(())
}

// reconcile is invoked by kube-rs whenever the watcher receives an event relevant to a Guestbook.
pub async fn reconcile(gb: Arc<Guestbook>, ctx: Arc<Data>) -> Result<Action, Error> {
    let gb_name = gb
        .metadata
        .name
        .as_ref()
        .ok_or_else(|| Error::MissingObjectKey(".metadata.name"))?;
    let gb_ns = gb
        .metadata
        .namespace
        .as_ref()
        .ok_or_else(|| Error::MissingObjectKey(".metadata.namespace"))?;
    let key = ObjectKey::new(gb_ns.clone(), gb_name.clone());

    let outcome = ctx
        .reconciler
        .reconcile_until_cancelled(&key, &ctx.shutdown)
        .await?;
    Ok(outcome_to_action(&outcome, ctx.reconciler.settings()))
}

pub fn outcome_to_action(outcome: &Outcome, settings: &ControllerSettings) -> Action {
    match outcome {
        Outcome::Done => Action::requeue(settings.resync_period),
        Outcome::Requeue(_) => Action::requeue(settings.requeue_after),
        Outcome::Cancelled => Action::await_change(),
    }
}

// error_policy defines the controller's behavior when the reconcile ends with an error.
pub fn error_policy(_gb: Arc<Guestbook>, error: &Error, ctx: Arc<Data>) -> Action {
    warn!("Reconcile failed due to error: {}", error);
    Action::requeue(ctx.reconciler.settings().error_backoff)
}

pub fn report_controller_reconciled<K, QueueErr>(
    controller_name: &str,
    result: &std::result::Result<(ObjectRef<K>, Action), controller::Error<Error, QueueErr>>,
) where
    K: Resource,
    QueueErr: std::error::Error + 'static,
{
    match result {
        Ok((obj, _)) => {
            info!(
                controller.name = controller_name,
                object = %obj,
                "Reconciled object"
            );
        }
        Err(err) => {
            error!(
                controller.name = controller_name,
                error = err as &dyn std::error::Error,
                "Failed to reconcile object",
            );
        }
    }
}
