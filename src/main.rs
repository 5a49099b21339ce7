// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};

use samples_operator::config::Config;
use samples_operator::kubernetes::{
    wait_for_samples_crd, KubeSecretStore, KubeStatusWriter, StatusWriter,
};
use samples_operator::reconcilers::{ConfigReconciler, SecretReconciler};
use samples_operator::sync::{
    CredentialMirror, CredentialSyncManager, SecretEventReconciler, UpsertCounter,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting samples operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: version={}, config_name={}, secret_retry_limit={}",
        config.version, config.config_name, config.secret_retry_limit
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for samples Config CRD to become available...");
    wait_for_samples_crd(&client).await?;

    let status_writer: Arc<dyn StatusWriter> = Arc::new(KubeStatusWriter::new(client.clone()));
    // Shared with any upsert cycle; secret events are deferred while it holds guards
    let upserts = UpsertCounter::new();
    let mirror = CredentialMirror::new(
        Arc::new(KubeSecretStore::new(client.clone())),
        config.version.clone(),
    );
    let secret_event_reconciler = SecretEventReconciler::new(
        mirror,
        status_writer.clone(),
        Arc::new(upserts.clone()),
        config.secret_retry_limit,
    );

    // Create the sync manager and get a handle for the secret watcher
    let (sync_manager, sync_handle) =
        CredentialSyncManager::new(client.clone(), config.clone(), secret_event_reconciler);

    let secret_reconciler = SecretReconciler::new(client.clone(), sync_handle);
    let config_reconciler =
        ConfigReconciler::new(client.clone(), status_writer, config.config_name.clone());

    info!("Starting reconcilers...");

    tokio::try_join!(
        sync_manager.run(),
        secret_reconciler.run(),
        config_reconciler.run()
    )?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
