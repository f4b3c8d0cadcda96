// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deciding which workloads to restart when a secret changes, and restarting them.

pub mod filter;
pub mod matcher;
pub mod reconcile;
pub mod restart;
pub mod tracker;

pub use filter::{admit_fingerprints, should_admit};
pub use matcher::{find_requests_for_secret, match_namespaces, match_workloads, policies_for_secret};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use restart::{restart, restart_all, RestartReport};
pub use tracker::{ContentTracker, SecretChange};
