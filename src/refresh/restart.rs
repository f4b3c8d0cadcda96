// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rolling restarts through a pod template annotation.

use crate::constants::annotations;
use crate::error::{Result, TraktorError};
use crate::kubernetes::workloads::{merge_patch, Workload};
use chrono::{DateTime, SecondsFormat, Utc};
use kube::Client;
use tracing::{error, info, instrument};

/// RFC 3339 UTC timestamp written into the restart annotation
pub fn restart_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Merge patch that sets the restart annotation and nothing else
pub fn restart_patch(timestamp: &str) -> serde_json::Value {
    let mut template_annotations = serde_json::Map::new();
    template_annotations.insert(annotations::RESTARTED_AT.to_string(), timestamp.into());

    serde_json::json!({
        "spec": {
            "template": {
                "metadata": {
                    "annotations": template_annotations
                }
            }
        }
    })
}

/// Trigger a rolling restart of one workload
#[instrument(skip(client, workload), fields(workload = %workload.reference()))]
pub async fn restart(client: &Client, workload: &Workload, timestamp: &str) -> Result<()> {
    merge_patch(client, workload, &restart_patch(timestamp))
        .await
        .map_err(|source| TraktorError::StoreWrite {
            kind: workload.kind.to_string(),
            namespace: workload.namespace.clone(),
            name: workload.name.clone(),
            source,
        })
}

/// Result of restarting a single workload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkloadOutcome {
    Restarted,
    Failed(String),
}

/// Per-workload outcomes of one restart batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestartReport {
    pub outcomes: Vec<(String, WorkloadOutcome)>,
}

impl RestartReport {
    pub fn restarted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == WorkloadOutcome::Restarted)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.restarted()
    }
}

/// Restart every workload in the batch. A failed patch is logged and counted, and the
/// remaining workloads are still attempted.
pub async fn restart_all(client: &Client, workloads: &[&Workload], timestamp: &str) -> RestartReport {
    let mut report = RestartReport::default();

    for workload in workloads {
        let outcome = match restart(client, workload, timestamp).await {
            Ok(()) => {
                info!(workload = %workload.reference(), restarted_at = %timestamp, "Workload restarted");
                WorkloadOutcome::Restarted
            }
            Err(e) => {
                error!(workload = %workload.reference(), error = %e, "Failed to restart workload");
                WorkloadOutcome::Failed(e.to_string())
            }
        };
        report.outcomes.push((workload.reference(), outcome));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::workloads::WorkloadKind;
    use crate::test_utils::{deployment_json, MockService};
    use chrono::TimeZone;

    fn workload(kind: WorkloadKind, name: &str) -> Workload {
        Workload {
            kind,
            namespace: "ns-a".to_string(),
            name: name.to_string(),
            pod_spec: None,
        }
    }

    #[test]
    fn test_restart_timestamp_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(restart_timestamp(now), "2026-03-04T05:06:07.000Z");
    }

    #[test]
    fn test_restarts_within_one_second_write_different_patches() {
        let first = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let second = first + chrono::Duration::milliseconds(900);

        assert_eq!(restart_timestamp(second), "2026-03-04T05:06:07.900Z");
        assert_ne!(
            restart_patch(&restart_timestamp(first)),
            restart_patch(&restart_timestamp(second))
        );
    }

    #[test]
    fn test_restart_timestamps_sort_chronologically() {
        let earlier = restart_timestamp(Utc.with_ymd_and_hms(2026, 9, 30, 23, 59, 59).unwrap());
        let later = restart_timestamp(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn test_restart_patch_only_touches_annotation() {
        let patch = restart_patch("2026-03-04T05:06:07Z");

        assert_eq!(
            patch,
            serde_json::json!({
                "spec": { "template": { "metadata": { "annotations": {
                    "traktor.gdxcloud.net/restartedAt": "2026-03-04T05:06:07Z"
                } } } }
            })
        );
    }

    #[test]
    fn test_repeated_patches_differ_only_in_timestamp() {
        let first = restart_patch("2026-03-04T05:06:07Z");
        let second = restart_patch("2026-03-04T05:10:00Z");

        let mut normalized = second.clone();
        normalized["spec"]["template"]["metadata"]["annotations"][annotations::RESTARTED_AT] =
            first["spec"]["template"]["metadata"]["annotations"][annotations::RESTARTED_AT].clone();

        assert_ne!(first, second);
        assert_eq!(first, normalized);
    }

    #[tokio::test]
    async fn test_restart_sends_merge_patch() {
        let mock = MockService::new().on_patch(
            "/apis/apps/v1/namespaces/ns-a/deployments/web",
            200,
            &deployment_json("ns-a", "web", serde_json::json!({})).to_string(),
        );
        let client = mock.client();

        restart(&client, &workload(WorkloadKind::Deployment, "web"), "2026-03-04T05:06:07Z")
            .await
            .unwrap();

        let patches = mock.requests_with_method("PATCH");
        assert_eq!(patches.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&patches[0].body).unwrap();
        assert_eq!(body, restart_patch("2026-03-04T05:06:07Z"));
    }

    #[tokio::test]
    async fn test_restart_failure_is_store_write_error() {
        let client = MockService::new().into_client();

        let result = restart(&client, &workload(WorkloadKind::StatefulSet, "db"), "t").await;

        match result {
            Err(TraktorError::StoreWrite { kind, namespace, name, .. }) => {
                assert_eq!(kind, "StatefulSet");
                assert_eq!(namespace, "ns-a");
                assert_eq!(name, "db");
            }
            other => panic!("expected StoreWrite error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_restart_all_continues_after_failure() {
        let mock = MockService::new()
            .on_patch(
                "/apis/apps/v1/namespaces/ns-a/deployments/first",
                200,
                &deployment_json("ns-a", "first", serde_json::json!({})).to_string(),
            )
            .on_patch(
                "/apis/apps/v1/namespaces/ns-a/deployments/third",
                200,
                &deployment_json("ns-a", "third", serde_json::json!({})).to_string(),
            );
        let client = mock.client();
        let first = workload(WorkloadKind::Deployment, "first");
        let second = workload(WorkloadKind::Deployment, "second");
        let third = workload(WorkloadKind::Deployment, "third");

        let report = restart_all(&client, &[&first, &second, &third], "2026-03-04T05:06:07Z").await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.restarted(), 2);
        assert_eq!(report.failed(), 1);
        assert!(matches!(report.outcomes[1].1, WorkloadOutcome::Failed(_)));
        assert_eq!(mock.requests_with_method("PATCH").len(), 3);
    }
}
