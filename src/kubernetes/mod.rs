// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery, label selectors and workload access.

pub mod crd;
pub mod selector;
pub mod workloads;

pub use crd::wait_for_secrets_refresh_crd;
pub use workloads::{list_workloads, Workload, WorkloadKind};
