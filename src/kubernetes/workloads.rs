// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Listing and patching the workload kinds Traktor can restart.

use crate::constants::OPERATOR_NAME;
use crate::error::{Result, TraktorError};
use anyhow::anyhow;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{ListParams, Patch, PatchParams},
    Api, Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Workload kinds with a pod template that can be rolled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    pub const ALL: [WorkloadKind; 3] = [
        WorkloadKind::Deployment,
        WorkloadKind::StatefulSet,
        WorkloadKind::DaemonSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        WorkloadKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("unknown workload kind '{}'", s))
    }
}

/// A workload reduced to what the refresh loop needs: identity and pod spec
#[derive(Clone, Debug, PartialEq)]
pub struct Workload {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
    pub pod_spec: Option<PodSpec>,
}

impl Workload {
    /// `Kind namespace/name`, for log records
    pub fn reference(&self) -> String {
        format!("{} {}/{}", self.kind, self.namespace, self.name)
    }
}

impl From<Deployment> for Workload {
    fn from(d: Deployment) -> Self {
        Workload {
            kind: WorkloadKind::Deployment,
            namespace: d.namespace().unwrap_or_default(),
            name: d.name_any(),
            pod_spec: d.spec.and_then(|s| s.template.spec),
        }
    }
}

impl From<StatefulSet> for Workload {
    fn from(s: StatefulSet) -> Self {
        Workload {
            kind: WorkloadKind::StatefulSet,
            namespace: s.namespace().unwrap_or_default(),
            name: s.name_any(),
            pod_spec: s.spec.and_then(|s| s.template.spec),
        }
    }
}

impl From<DaemonSet> for Workload {
    fn from(d: DaemonSet) -> Self {
        Workload {
            kind: WorkloadKind::DaemonSet,
            namespace: d.namespace().unwrap_or_default(),
            name: d.name_any(),
            pod_spec: d.spec.and_then(|s| s.template.spec),
        }
    }
}

/// List every workload of the given kinds in a namespace
#[instrument(skip(client, kinds))]
pub async fn list_workloads(
    client: &Client,
    namespace: &str,
    kinds: &[WorkloadKind],
) -> Result<Vec<Workload>> {
    let mut workloads = Vec::new();
    for kind in kinds {
        match kind {
            WorkloadKind::Deployment => {
                workloads.extend(list_kind::<Deployment>(client, namespace, *kind).await?)
            }
            WorkloadKind::StatefulSet => {
                workloads.extend(list_kind::<StatefulSet>(client, namespace, *kind).await?)
            }
            WorkloadKind::DaemonSet => {
                workloads.extend(list_kind::<DaemonSet>(client, namespace, *kind).await?)
            }
        }
    }
    Ok(workloads)
}

async fn list_kind<K>(client: &Client, namespace: &str, kind: WorkloadKind) -> Result<Vec<Workload>>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + fmt::Debug
        + Into<Workload>,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let list = api.list(&ListParams::default()).await.map_err(|e| {
        TraktorError::StoreRead(format!("{}s in namespace {}", kind, namespace), e)
    })?;
    Ok(list.items.into_iter().map(Into::into).collect())
}

/// Apply a JSON merge patch to a workload
pub async fn merge_patch(
    client: &Client,
    workload: &Workload,
    patch: &serde_json::Value,
) -> kube::Result<()> {
    match workload.kind {
        WorkloadKind::Deployment => merge_patch_kind::<Deployment>(client, workload, patch).await,
        WorkloadKind::StatefulSet => merge_patch_kind::<StatefulSet>(client, workload, patch).await,
        WorkloadKind::DaemonSet => merge_patch_kind::<DaemonSet>(client, workload, patch).await,
    }
}

async fn merge_patch_kind<K>(
    client: &Client,
    workload: &Workload,
    patch: &serde_json::Value,
) -> kube::Result<()>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + fmt::Debug,
{
    let api: Api<K> = Api::namespaced(client.clone(), &workload.namespace);
    let pp = PatchParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    };
    api.patch(&workload.name, &pp, &Patch::Merge(patch)).await?;
    Ok(())
}
