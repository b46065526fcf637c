// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
use std::time::Duration;

/// Bounded exponential backoff for status writes that hit a conflict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetrySettings {
    /// Delay to wait after the given (1-based) failed attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Delay before re-checking a guestbook after a successful pass.
    pub resync_period: Duration,
    /// Delay before retrying a pass that stopped on a transient failure.
    pub requeue_after: Duration,
    /// Delay before retrying a pass that failed.
    pub error_backoff: Duration,
    pub status_retry: RetrySettings,
    /// Watch a single namespace instead of the whole cluster.
    pub namespace: Option<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            resync_period: Duration::from_secs(60),
            requeue_after: Duration::from_secs(10),
            error_backoff: Duration::from_secs(10),
            status_retry: RetrySettings::default(),
            namespace: None,
        }
    }
}
