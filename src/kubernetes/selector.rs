// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Label selector evaluation on top of kube's [`Selector`].

use crate::error::{Result, TraktorError};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::core::{Selector, SelectorExt};
use std::collections::BTreeMap;

/// Compile an API label selector, failing on unknown operators
pub fn parse(selector: &LabelSelector) -> Result<Selector> {
    Selector::try_from(selector.clone()).map_err(|e| TraktorError::SelectorParse(e.to_string()))
}

/// Match an optional selector against a label set. Absent selects everything.
pub fn matches_optional(
    selector: Option<&LabelSelector>,
    labels: &BTreeMap<String, String>,
) -> Result<bool> {
    match selector {
        None => Ok(true),
        Some(s) => Ok(parse(s)?.matches(labels)),
    }
}
