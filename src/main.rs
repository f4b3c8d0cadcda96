// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use traktor::config::Config;
use traktor::kubernetes::wait_for_secrets_refresh_crd;
use traktor::reconcilers::SecretReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Traktor operator");

    let config = Config::from_env()?;
    info!(
        operator_namespace = %config.operator_namespace,
        max_concurrent_reconciles = config.max_concurrent_reconciles,
        workload_kinds = ?config.workload_kinds,
        "Configuration loaded"
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for SecretsRefresh CRD to become available...");
    wait_for_secrets_refresh_crd(&client).await?;

    let secret_reconciler = SecretReconciler::new(client, &config);

    info!("Starting secret reconciler...");

    tokio::select! {
        result = secret_reconciler.run() => {
            result?;
            warn!("Secret reconciler stopped unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping");
        }
    }

    Ok(())
}
