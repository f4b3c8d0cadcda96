// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys written by Traktor
pub mod annotations {
    /// Set on a workload's pod template to force a rolling restart
    pub const RESTARTED_AT: &str = "traktor.gdxcloud.net/restartedAt";
}

/// The operator name used as field manager for patches
pub const OPERATOR_NAME: &str = "traktor";

/// Namespace the operator assumes it runs in when POD_NAMESPACE is not set
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "traktor-system";

/// Watcher timeout in seconds, kept below the client read timeout
pub const WATCH_TIMEOUT_SECS: u32 = 290;

/// Retry backoff for failed reconcile requests
pub mod retry {
    pub const BASE_DELAY_SECS: u64 = 5;
    pub const MAX_DELAY_SECS: u64 = 300;
}

/// CRD identity and polling configuration
pub mod crd {
    pub const GROUP: &str = "traktor.gdxcloud.net";
    pub const VERSION: &str = "v1alpha1";
    pub const KIND: &str = "SecretsRefresh";

    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
