// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

/// Selects the secrets whose content changes restart dependent workloads.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "traktor.gdxcloud.net",
    version = "v1alpha1",
    kind = "SecretsRefresh",
    plural = "secretsrefreshes",
    shortname = "sr"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct SecretsRefreshSpec {
    /// Namespaces to watch. Absent selects every namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
    /// Secrets to watch within the selected namespaces. Absent selects every secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_selector: Option<LabelSelector>,
    /// How workloads are picked once a secret has changed.
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// Which workloads in the secret's namespace are restarted
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every managed workload in the namespace
    Coarse,
    /// Only workloads that reference the changed secret
    #[default]
    Fine,
}

impl SecretsRefresh {
    /// `namespace/name` of this policy, for log records
    pub fn reference(&self) -> String {
        format!("{}/{}", self.namespace().unwrap_or_default(), self.name_any())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;
    use std::collections::BTreeMap;

    #[test]
    fn test_match_mode_defaults_to_fine() {
        let spec: SecretsRefreshSpec = serde_json::from_str("{}").unwrap();

        assert_eq!(spec.match_mode, MatchMode::Fine);
        assert!(spec.namespace_selector.is_none());
        assert!(spec.secret_selector.is_none());
    }

    #[test]
    fn test_spec_deserializes_camel_case() {
        let spec: SecretsRefreshSpec = serde_json::from_value(serde_json::json!({
            "namespaceSelector": { "matchLabels": { "env": "test" } },
            "secretSelector": { "matchLabels": { "tier": "app" } },
            "matchMode": "coarse"
        }))
        .unwrap();

        assert_eq!(spec.match_mode, MatchMode::Coarse);
        assert_eq!(
            spec.namespace_selector.unwrap().match_labels,
            Some(BTreeMap::from([("env".to_string(), "test".to_string())]))
        );
        assert!(spec.secret_selector.is_some());
    }

    #[test]
    fn test_unknown_match_mode_rejected() {
        let result: Result<SecretsRefreshSpec, _> =
            serde_json::from_value(serde_json::json!({ "matchMode": "everything" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_reference() {
        let policy = SecretsRefresh {
            metadata: ObjectMeta {
                name: Some("refresh-all".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: SecretsRefreshSpec::default(),
        };

        assert_eq!(policy.reference(), "default/refresh-all");
    }
}
