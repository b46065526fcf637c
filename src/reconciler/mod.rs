// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod reconcile;
pub mod status;

pub use reconcile::{GuestbookReconciler, Outcome};
