// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Matching changed secrets to policies, namespaces and dependent workloads.

use crate::error::{Result, TraktorError};
use crate::kubernetes::selector::{matches_optional, parse as parse_selector};
use crate::kubernetes::workloads::Workload;
use crate::types::{MatchMode, ReconcileRequest, SecretSnapshot, SecretsRefresh};
use k8s_openapi::api::core::v1::{EnvFromSource, EnvVar, Namespace, PodSpec};
use kube::{api::ListParams, core::SelectorExt, Api, Client, ResourceExt};
use std::collections::BTreeSet;
use tracing::{debug, instrument, warn};

/// Names of the namespaces selected by a policy.
///
/// A policy without a namespace selector selects every namespace. A malformed selector
/// is returned as an error.
pub fn match_namespaces(
    policy: &SecretsRefresh,
    namespaces: &[Namespace],
) -> Result<BTreeSet<String>> {
    let Some(selector) = policy.spec.namespace_selector.as_ref() else {
        return Ok(namespaces.iter().map(|ns| ns.name_any()).collect());
    };

    let selector = parse_selector(selector).map_err(|e| match e {
        TraktorError::SelectorParse(reason) => TraktorError::SelectorParse(format!(
            "namespaceSelector of {}: {}",
            policy.reference(),
            reason
        )),
        other => other,
    })?;

    Ok(namespaces
        .iter()
        .filter(|ns| selector.matches(ns.labels()))
        .map(|ns| ns.name_any())
        .collect())
}

/// Workloads whose pod template references the secret by exact name
pub fn match_workloads<'a>(secret_name: &str, workloads: &'a [Workload]) -> Vec<&'a Workload> {
    workloads
        .iter()
        .filter(|w| {
            w.pod_spec
                .as_ref()
                .is_some_and(|spec| pod_spec_uses_secret(spec, secret_name))
        })
        .collect()
}

/// Check whether a pod spec references a secret through volumes, env, envFrom or
/// image pull secrets, across regular, init and ephemeral containers.
pub fn pod_spec_uses_secret(spec: &PodSpec, secret_name: &str) -> bool {
    let in_volumes = spec.volumes.iter().flatten().any(|volume| {
        let direct = volume
            .secret
            .as_ref()
            .and_then(|s| s.secret_name.as_deref())
            .is_some_and(|name| name == secret_name);
        let projected = volume
            .projected
            .as_ref()
            .and_then(|p| p.sources.as_ref())
            .is_some_and(|sources| {
                sources
                    .iter()
                    .filter_map(|source| source.secret.as_ref())
                    .any(|s| s.name == secret_name)
            });
        direct || projected
    });
    if in_volumes {
        return true;
    }

    let in_containers = spec
        .containers
        .iter()
        .chain(spec.init_containers.iter().flatten())
        .any(|c| env_uses_secret(c.env.as_deref(), c.env_from.as_deref(), secret_name));
    if in_containers {
        return true;
    }

    let in_ephemeral = spec
        .ephemeral_containers
        .iter()
        .flatten()
        .any(|c| env_uses_secret(c.env.as_deref(), c.env_from.as_deref(), secret_name));
    if in_ephemeral {
        return true;
    }

    spec.image_pull_secrets
        .iter()
        .flatten()
        .any(|reference| reference.name == secret_name)
}

fn env_uses_secret(
    env: Option<&[EnvVar]>,
    env_from: Option<&[EnvFromSource]>,
    secret_name: &str,
) -> bool {
    let from_env = env.unwrap_or_default().iter().any(|var| {
        var.value_from
            .as_ref()
            .and_then(|source| source.secret_key_ref.as_ref())
            .is_some_and(|key_ref| key_ref.name == secret_name)
    });
    let from_env_from = env_from
        .unwrap_or_default()
        .iter()
        .filter_map(|source| source.secret_ref.as_ref())
        .any(|secret_ref| secret_ref.name == secret_name);
    from_env || from_env_from
}

/// Reconcile requests for every policy interested in a changed secret.
///
/// A policy is interested when the secret's namespace is selected and the secret's labels
/// satisfy the secret selector, if any. Policies with malformed selectors are skipped with
/// a warning. When a coarse request covers a namespace, fine requests for the same
/// namespace are dropped.
pub fn policies_for_secret(
    secret: &SecretSnapshot,
    policies: &[SecretsRefresh],
    namespaces: &[Namespace],
) -> Vec<ReconcileRequest> {
    let mut requests = BTreeSet::new();

    for policy in policies {
        let selected = match match_namespaces(policy, namespaces) {
            Ok(selected) => selected,
            Err(e) => {
                warn!(policy = %policy.reference(), error = %e, "Skipping policy");
                continue;
            }
        };
        if !selected.contains(&secret.namespace) {
            continue;
        }

        match matches_optional(policy.spec.secret_selector.as_ref(), &secret.labels) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!(
                    policy = %policy.reference(),
                    error = %e,
                    "Skipping policy with invalid secretSelector"
                );
                continue;
            }
        }

        debug!(policy = %policy.reference(), secret = %secret.reference(), "Policy matches secret");

        requests.insert(match policy.spec.match_mode {
            MatchMode::Coarse => ReconcileRequest::Namespace {
                namespace: secret.namespace.clone(),
            },
            MatchMode::Fine => ReconcileRequest::Secret {
                namespace: secret.namespace.clone(),
                name: secret.name.clone(),
            },
        });
    }

    let coarse: BTreeSet<String> = requests
        .iter()
        .filter_map(|r| match r {
            ReconcileRequest::Namespace { namespace } => Some(namespace.clone()),
            ReconcileRequest::Secret { .. } => None,
        })
        .collect();

    requests
        .into_iter()
        .filter(|r| match r {
            ReconcileRequest::Secret { namespace, .. } => !coarse.contains(namespace),
            ReconcileRequest::Namespace { .. } => true,
        })
        .collect()
}

/// Map a changed secret to reconcile requests, reading policies and namespaces afresh
#[instrument(skip(client, secret), fields(secret = %secret.reference()))]
pub async fn find_requests_for_secret(
    client: &Client,
    secret: &SecretSnapshot,
) -> Result<Vec<ReconcileRequest>> {
    let policies: Api<SecretsRefresh> = Api::all(client.clone());
    let policies = policies
        .list(&ListParams::default())
        .await
        .map_err(|e| TraktorError::StoreRead("SecretsRefresh policies".to_string(), e))?
        .items;

    if policies.is_empty() {
        debug!("No SecretsRefresh policies defined");
        return Ok(Vec::new());
    }

    let namespaces: Api<Namespace> = Api::all(client.clone());
    let namespaces = namespaces
        .list(&ListParams::default())
        .await
        .map_err(|e| TraktorError::StoreRead("namespaces".to_string(), e))?
        .items;

    Ok(policies_for_secret(secret, &policies, &namespaces))
}
