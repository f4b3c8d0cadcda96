// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::DEFAULT_OPERATOR_NAMESPACE;
use crate::kubernetes::workloads::WorkloadKind;
use anyhow::{bail, Context, Result};
use std::env;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace the operator runs in; secret changes here never trigger restarts
    pub operator_namespace: String,
    /// Upper bound on reconcile requests processed at the same time
    pub max_concurrent_reconciles: usize,
    /// Workload kinds that are restarted when a referenced secret changes
    pub workload_kinds: Vec<WorkloadKind>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            operator_namespace: DEFAULT_OPERATOR_NAMESPACE.to_string(),
            max_concurrent_reconciles: 4,
            workload_kinds: WorkloadKind::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let operator_namespace = lookup("POD_NAMESPACE")
            .filter(|ns| !ns.trim().is_empty())
            .unwrap_or(defaults.operator_namespace);

        let max_concurrent_reconciles = match lookup("MAX_CONCURRENT_RECONCILES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_CONCURRENT_RECONCILES is not a number: {}", raw))?,
            None => defaults.max_concurrent_reconciles,
        };
        if max_concurrent_reconciles == 0 {
            bail!("MAX_CONCURRENT_RECONCILES must be at least 1");
        }

        let workload_kinds = match lookup("WORKLOAD_KINDS") {
            Some(raw) => parse_workload_kinds(&raw)?,
            None => defaults.workload_kinds,
        };

        Ok(Config {
            operator_namespace,
            max_concurrent_reconciles,
            workload_kinds,
        })
    }
}

fn parse_workload_kinds(raw: &str) -> Result<Vec<WorkloadKind>> {
    let mut kinds = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let kind: WorkloadKind = part
            .parse()
            .with_context(|| format!("Invalid entry in WORKLOAD_KINDS: {}", part))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        bail!("WORKLOAD_KINDS must name at least one workload kind");
    }
    Ok(kinds)
}
