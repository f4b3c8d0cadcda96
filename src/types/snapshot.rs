// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Point-in-time view of a Secret as seen by the change filter.

use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Digest of a secret's content, safe to keep around after the secret is gone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

/// Observed state of a secret: identity, labels and content
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecretSnapshot {
    pub namespace: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub content: BTreeMap<String, Vec<u8>>,
}

impl SecretSnapshot {
    /// Canonical serialization of the content: keys in sorted order as `key=value;`
    pub fn canonical(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in &self.content {
            out.extend_from_slice(key.as_bytes());
            out.push(b'=');
            out.extend_from_slice(value);
            out.push(b';');
        }
        out
    }

    /// SHA-256 of the canonical serialization.
    ///
    /// Two snapshots hold the same content iff their fingerprints are equal.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(Sha256::digest(self.canonical()).into())
    }

    /// `namespace/name`, for log records
    pub fn reference(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl From<&Secret> for SecretSnapshot {
    fn from(secret: &Secret) -> Self {
        let content = secret
            .data
            .as_ref()
            .map(|data| {
                data.iter()
                    .map(|(k, v)| (k.clone(), v.0.clone()))
                    .collect()
            })
            .unwrap_or_default();

        SecretSnapshot {
            namespace: secret.namespace().unwrap_or_default(),
            name: secret.name_any(),
            labels: secret.labels().clone(),
            content,
        }
    }
}
