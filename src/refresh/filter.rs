// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Gate for secret change events.

use crate::types::{Fingerprint, SecretSnapshot};

/// Decide whether a secret change should enter the refresh loop.
///
/// Creations (no old snapshot) and deletions (no new snapshot) are never admitted, so a
/// fresh watch or a controller restart does not restart anything. Updates are admitted
/// only when the content fingerprint differs; label and annotation changes are ignored.
pub fn should_admit(old: Option<&SecretSnapshot>, new: Option<&SecretSnapshot>) -> bool {
    admit_fingerprints(
        old.map(SecretSnapshot::fingerprint),
        new.map(SecretSnapshot::fingerprint),
    )
}

/// [`should_admit`] over fingerprints remembered from earlier observations
pub fn admit_fingerprints(old: Option<Fingerprint>, new: Option<Fingerprint>) -> bool {
    match (old, new) {
        (Some(old), Some(new)) => old != new,
        _ => false,
    }
}
