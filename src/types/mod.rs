// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types consumed by the refresh loop.

pub mod request;
pub mod secrets_refresh;
pub mod snapshot;

pub use request::ReconcileRequest;
pub use secrets_refresh::{MatchMode, SecretsRefresh, SecretsRefreshSpec};
pub use snapshot::{Fingerprint, SecretSnapshot};
