// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation entry point: one reconcile request in, one restart batch out.

use crate::config::Config;
use crate::error::Result;
use crate::kubernetes::workloads::{list_workloads, Workload, WorkloadKind};
use crate::refresh::matcher::match_workloads;
use crate::refresh::restart::{restart_all, restart_timestamp, RestartReport};
use crate::types::ReconcileRequest;
use chrono::Utc;
use kube::Client;
use tracing::{debug, info, instrument};

/// What a reconcile invocation did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The request targets the operator's own namespace and was ignored
    SkippedOwnNamespace,
    /// Matched workloads were restarted (or attempted)
    Completed(RestartReport),
}

/// Restarts the workloads targeted by reconcile requests
#[derive(Clone)]
pub struct Reconciler {
    client: Client,
    operator_namespace: String,
    workload_kinds: Vec<WorkloadKind>,
}

impl Reconciler {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            operator_namespace: config.operator_namespace.clone(),
            workload_kinds: config.workload_kinds.clone(),
        }
    }

    /// Handle one request against the current cluster state.
    ///
    /// Fails only when workloads cannot be listed; individual restart failures are part of
    /// the returned report.
    #[instrument(skip(self), fields(request = %request))]
    pub async fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileOutcome> {
        let namespace = request.namespace();

        if namespace == self.operator_namespace {
            info!(namespace = %namespace, "Skipping operator's own namespace to prevent self-restart");
            return Ok(ReconcileOutcome::SkippedOwnNamespace);
        }

        let workloads = list_workloads(&self.client, namespace, &self.workload_kinds).await?;

        let targets: Vec<&Workload> = match request {
            ReconcileRequest::Namespace { .. } => workloads.iter().collect(),
            ReconcileRequest::Secret { name, .. } => match_workloads(name, &workloads),
        };

        debug!(
            matched = targets.len(),
            total = workloads.len(),
            "Selected workloads for restart"
        );

        let timestamp = restart_timestamp(Utc::now());
        let report = restart_all(&self.client, &targets, &timestamp).await;

        info!(
            namespace = %namespace,
            restarted = report.restarted(),
            failed = report.failed(),
            total_workloads = workloads.len(),
            "Completed workload restart"
        );

        Ok(ReconcileOutcome::Completed(report))
    }
}
