// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

/// A unit of work for the refresh loop
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReconcileRequest {
    /// Restart every managed workload in the namespace
    Namespace { namespace: String },
    /// Restart the workloads in the namespace that reference the secret
    Secret { namespace: String, name: String },
}

impl ReconcileRequest {
    pub fn namespace(&self) -> &str {
        match self {
            ReconcileRequest::Namespace { namespace } => namespace,
            ReconcileRequest::Secret { namespace, .. } => namespace,
        }
    }
}

impl fmt::Display for ReconcileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileRequest::Namespace { namespace } => write!(f, "namespace {}", namespace),
            ReconcileRequest::Secret { namespace, name } => {
                write!(f, "secret {}/{}", namespace, name)
            }
        }
    }
}
