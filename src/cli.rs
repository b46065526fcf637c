// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use crate::settings::{ControllerSettings, RetrySettings};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "guestbook_controller")]
#[command(version, about = "Converges Guestbook resources into a ConfigMap and worker pods")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the Guestbook custom resource definition as YAML.
    Export,
    /// Run the controller against the cluster from the ambient kubeconfig.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Only watch guestbooks in this namespace.
    #[arg(long, env = "GUESTBOOK_NAMESPACE")]
    pub namespace: Option<String>,

    /// Seconds between re-checks of a converged guestbook.
    #[arg(long, env = "GUESTBOOK_RESYNC_SECS", default_value_t = 60)]
    pub resync_secs: u64,

    /// Seconds before retrying a pass that hit a transient error.
    #[arg(long, env = "GUESTBOOK_REQUEUE_SECS", default_value_t = 10)]
    pub requeue_secs: u64,

    /// Seconds before retrying a failed pass.
    #[arg(long, env = "GUESTBOOK_ERROR_BACKOFF_SECS", default_value_t = 10)]
    pub error_backoff_secs: u64,

    /// Attempts at writing status before giving up on conflicts.
    #[arg(long, env = "GUESTBOOK_STATUS_RETRY_ATTEMPTS", default_value_t = 5)]
    pub status_retry_attempts: u32,

    /// Initial backoff between conflicting status writes, in milliseconds.
    #[arg(long, env = "GUESTBOOK_STATUS_RETRY_BACKOFF_MS", default_value_t = 10)]
    pub status_retry_backoff_ms: u64,

    /// Ceiling for the status write backoff, in milliseconds.
    #[arg(long, env = "GUESTBOOK_STATUS_RETRY_MAX_BACKOFF_MS", default_value_t = 1000)]
    pub status_retry_max_backoff_ms: u64,
}

impl RunArgs {
    pub fn settings(&self) -> ControllerSettings {
        ControllerSettings {
            resync_period: Duration::from_secs(self.resync_secs),
            requeue_after: Duration::from_secs(self.requeue_secs),
            error_backoff: Duration::from_secs(self.error_backoff_secs),
            status_retry: RetrySettings {
                max_attempts: self.status_retry_attempts,
                initial_backoff: Duration::from_millis(self.status_retry_backoff_ms),
                max_backoff: Duration::from_millis(self.status_retry_max_backoff_ms),
            },
            namespace: self.namespace.clone(),
        }
    }
}
