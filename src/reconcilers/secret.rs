// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - watches Secrets and restarts the workloads that depend on the ones
//! whose content changed.

use crate::config::Config;
use crate::constants::{
    retry::{BASE_DELAY_SECS, MAX_DELAY_SECS},
    WATCH_TIMEOUT_SECS,
};
use crate::error::{Result, TraktorError};
use crate::refresh::tracker::ContentTracker;
use crate::refresh::{find_requests_for_secret, ReconcileOutcome, Reconciler};
use crate::types::SecretSnapshot;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{
        controller::{Action, Config as ControllerConfig},
        reflector::{ObjectRef, Store},
        Controller,
    },
    Api, Client,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct SecretReconciler {
    client: Client,
    config: Config,
}

impl SecretReconciler {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let controller = Controller::new(
            secrets,
            WatcherConfig::default().timeout(WATCH_TIMEOUT_SECS),
        )
        .with_config(
            ControllerConfig::default().concurrency(concurrency_limit(
                self.config.max_concurrent_reconciles,
            )),
        );
        let context = Arc::new(Context::new(self.client, &self.config, controller.store()));

        info!("Watching secrets in all namespaces");

        controller
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok((secret, _)) => debug!("Reconciled secret: {}", secret),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        warn!("Secret controller stream ended");
        Ok(())
    }
}

/// Shared state of the secret controller
pub struct Context {
    client: Client,
    reconciler: Reconciler,
    tracker: ContentTracker,
    failures: Mutex<HashMap<ObjectRef<Secret>, u32>>,
    store: Store<Secret>,
}

impl Context {
    pub fn new(client: Client, config: &Config, store: Store<Secret>) -> Self {
        Self {
            reconciler: Reconciler::new(client.clone(), config),
            client,
            tracker: ContentTracker::default(),
            failures: Mutex::new(HashMap::new()),
            store,
        }
    }

    /// Count a failed reconcile and return the attempt number
    fn record_failure(&self, key: ObjectRef<Secret>) -> u32 {
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let attempts = failures.entry(key).or_insert(0);
        *attempts += 1;
        *attempts
    }

    fn clear_failures(&self, key: &ObjectRef<Secret>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

async fn reconcile(secret: Arc<Secret>, ctx: Arc<Context>) -> Result<Action> {
    let snapshot = SecretSnapshot::from(secret.as_ref());
    let change = ctx.tracker.observe(&secret);

    if !change.is_admitted() {
        debug!(secret = %snapshot.reference(), "No content change, nothing to restart");
        ctx.tracker.acknowledge(&secret, change.current());
        ctx.tracker.prune(|key| ctx.store.get(key).is_some());
        return Ok(Action::await_change());
    }

    info!(secret = %snapshot.reference(), "Secret content changed, finding interested policies");

    let requests = find_requests_for_secret(&ctx.client, &snapshot).await?;
    if requests.is_empty() {
        debug!(secret = %snapshot.reference(), "No policy selects this secret");
    }

    for request in &requests {
        if let ReconcileOutcome::Completed(report) = ctx.reconciler.reconcile(request).await? {
            if report.failed() > 0 {
                warn!(
                    secret = %snapshot.reference(),
                    failed = report.failed(),
                    restarted = report.restarted(),
                    "Some workloads could not be restarted"
                );
            }
        }
    }

    ctx.tracker.acknowledge(&secret, change.current());
    ctx.clear_failures(&ObjectRef::from_obj(secret.as_ref()));
    Ok(Action::await_change())
}

fn error_policy(secret: Arc<Secret>, error: &TraktorError, ctx: Arc<Context>) -> Action {
    let key = ObjectRef::from_obj(secret.as_ref());
    let attempt = ctx.record_failure(key.clone());
    let delay = retry_delay(
        attempt,
        Duration::from_secs(BASE_DELAY_SECS),
        Duration::from_secs(MAX_DELAY_SECS),
    );
    warn!(
        secret = %key,
        error = %error,
        attempt,
        retry_in_secs = delay.as_secs(),
        "Reconcile failed, scheduling retry"
    );
    Action::requeue(delay)
}

/// Exponential backoff: `base * 2^(attempt - 1)`, capped at `max`
fn retry_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent).min(max)
}

fn concurrency_limit(max_concurrent_reconciles: usize) -> u16 {
    u16::try_from(max_concurrent_reconciles)
        .unwrap_or(u16::MAX)
        .max(1)
}
