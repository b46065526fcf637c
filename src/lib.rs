// Copyright 2022 VMware, Inc.
// SPDX-License-Identifier: MIT
pub mod admission;
pub mod cli;
pub mod crds;
pub mod error;
pub mod reconciler;
pub mod resources;
pub mod settings;
pub mod shim_layer;
pub mod store;
#[cfg(test)]
pub mod unit_tests;

pub use error::Error;
