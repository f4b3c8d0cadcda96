// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Last acknowledged content fingerprint per secret.
//!
//! The controller hands the reconciler only the current object, so the previous content is
//! remembered here to pair every reconcile into an (old, new) change. Only digests are kept.

use crate::refresh::filter::admit_fingerprints;
use crate::types::{Fingerprint, SecretSnapshot};
use k8s_openapi::api::core::v1::Secret;
use kube::{runtime::reflector::ObjectRef, ResourceExt};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Entries kept before the first pruning pass
const PRUNE_MIN_ENTRIES: usize = 1024;

/// A secret as seen by one reconcile, relative to the last acknowledged content
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretChange {
    /// First sighting of this secret object, including a re-created name
    Created { current: Fingerprint },
    Updated {
        previous: Fingerprint,
        current: Fingerprint,
    },
}

impl SecretChange {
    /// Whether this change should trigger a restart
    pub fn is_admitted(&self) -> bool {
        match *self {
            SecretChange::Created { current } => admit_fingerprints(None, Some(current)),
            SecretChange::Updated { previous, current } => {
                admit_fingerprints(Some(previous), Some(current))
            }
        }
    }

    pub fn current(&self) -> Fingerprint {
        match *self {
            SecretChange::Created { current } | SecretChange::Updated { current, .. } => current,
        }
    }
}

#[derive(Debug)]
struct Seen {
    uid: Option<String>,
    fingerprint: Fingerprint,
}

#[derive(Debug, Default)]
struct State {
    seen: HashMap<ObjectRef<Secret>, Seen>,
    prune_at: usize,
}

#[derive(Debug, Default)]
pub struct ContentTracker {
    state: Mutex<State>,
}

impl ContentTracker {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compare a secret against its last acknowledged content
    pub fn observe(&self, secret: &Secret) -> SecretChange {
        let current = SecretSnapshot::from(secret).fingerprint();
        let uid = secret.uid();

        match self.state().seen.get(&ObjectRef::from_obj(secret)) {
            Some(seen) if seen.uid == uid => SecretChange::Updated {
                previous: seen.fingerprint,
                current,
            },
            _ => SecretChange::Created { current },
        }
    }

    /// Record content as handled. Until then the same content keeps comparing as changed.
    pub fn acknowledge(&self, secret: &Secret, fingerprint: Fingerprint) {
        self.state().seen.insert(
            ObjectRef::from_obj(secret),
            Seen {
                uid: secret.uid(),
                fingerprint,
            },
        );
    }

    /// Drop entries of secrets that no longer exist, once the tracker has doubled in size
    /// since the last pass
    pub fn prune(&self, is_live: impl Fn(&ObjectRef<Secret>) -> bool) {
        let mut state = self.state();
        if state.seen.len() < state.prune_at.max(PRUNE_MIN_ENTRIES) {
            return;
        }
        state.seen.retain(|key, _| is_live(key));
        state.prune_at = state.seen.len() * 2;
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.state().seen.len()
    }
}
