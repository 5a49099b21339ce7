// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sequential processing of credential secret events.

use crate::config::Config;
use crate::error::Result;
use crate::sync::credentials::{SecretEvent, SecretEventOutcome, SecretEventReconciler};
use crate::types::samples_config::SamplesConfig;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, ResourceExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// An event on the manager's queue
#[derive(Debug, Clone)]
enum Delivery {
    /// Straight from the watch
    Watched(SecretEvent),
    /// Deferred earlier; the snapshot may be older than later watch events
    Redelivered(SecretEvent),
}

/// Owns the secret event reconciler and feeds it one event at a time.
/// Events that come back as `Retry`, or that fail, are redelivered after the
/// configured delay.
pub struct CredentialSyncManager {
    client: Client,
    config: Config,
    reconciler: SecretEventReconciler,
    event_rx: mpsc::Receiver<Delivery>,
    handle: SyncManagerHandle,
}

/// Handle to send events to the CredentialSyncManager
#[derive(Clone)]
pub struct SyncManagerHandle {
    event_tx: mpsc::Sender<Delivery>,
}

impl SyncManagerHandle {
    pub async fn send(&self, event: SecretEvent) {
        self.deliver(Delivery::Watched(event)).await;
    }

    /// Redeliver an event once `delay` has passed
    pub fn send_after(&self, event: SecretEvent, delay: Duration) {
        let handle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.deliver(Delivery::Redelivered(event)).await;
        });
    }

    async fn deliver(&self, delivery: Delivery) {
        if let Err(e) = self.event_tx.send(delivery).await {
            error!("Failed to send event to CredentialSyncManager: {}", e);
        }
    }
}

impl CredentialSyncManager {
    pub fn new(
        client: Client,
        config: Config,
        reconciler: SecretEventReconciler,
    ) -> (Self, SyncManagerHandle) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let handle = SyncManagerHandle { event_tx };

        let manager = Self {
            client,
            config,
            reconciler,
            event_rx,
            handle: handle.clone(),
        };
        (manager, handle)
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("CredentialSyncManager started, listening for secret events...");

        while let Some(delivery) = self.event_rx.recv().await {
            self.process(delivery).await;
        }

        Ok(())
    }

    async fn process(&mut self, delivery: Delivery) {
        let event = match delivery {
            Delivery::Watched(event) => event,
            Delivery::Redelivered(event) => match self.refresh(event).await {
                Some(event) => event,
                None => return,
            },
        };
        self.handle_event(event).await;
    }

    /// Replace the snapshot of a deferred non-deletion event with the secret as
    /// it is now. Returns `None` when the secret is gone, since its deletion
    /// arrives through the watch. Deletions are kept as they are so repeated
    /// mirror deletions still count against the retry limit.
    async fn refresh(&self, event: SecretEvent) -> Option<SecretEvent> {
        if event.deleted {
            return Some(event);
        }

        let namespace = event.secret.namespace().unwrap_or_default();
        let name = event.secret.name_any();
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        match secrets.get_opt(&name).await {
            Ok(Some(current)) => Some(SecretEvent::applied(current)),
            Ok(None) => {
                debug!(
                    "Secret {}/{} no longer exists, dropping deferred event",
                    namespace, name
                );
                None
            }
            Err(e) => {
                warn!("Failed to refresh secret {}/{}: {}", namespace, name, e);
                self.handle.send_after(event, self.config.retry_delay);
                None
            }
        }
    }

    #[instrument(skip(self, event), fields(secret = %format!("{}/{}", event.secret.namespace().unwrap_or_default(), event.secret.name_any())))]
    async fn handle_event(&mut self, event: SecretEvent) {
        let mut samples = match self.get_samples_config().await {
            Ok(Some(samples)) => samples,
            Ok(None) => {
                debug!(
                    "Samples config {} does not exist yet, dropping secret event",
                    self.config.config_name
                );
                return;
            }
            Err(e) => {
                warn!("Failed to get samples config {}: {}", self.config.config_name, e);
                self.handle.send_after(event, self.config.retry_delay);
                return;
            }
        };

        match self.reconciler.process_secret_event(&mut samples, &event).await {
            Ok(SecretEventOutcome::Retry(reason)) => {
                debug!("{}", reason);
                self.handle.send_after(event, self.config.retry_delay);
            }
            Ok(outcome) => debug!("Processed secret event: {:?}", outcome),
            Err(e) => {
                warn!("Failed to process secret event: {}", e);
                self.handle.send_after(event, self.config.retry_delay);
            }
        }
    }

    async fn get_samples_config(&self) -> Result<Option<SamplesConfig>> {
        let configs: Api<SamplesConfig> = Api::all(self.client.clone());
        Ok(configs.get_opt(&self.config.config_name).await?)
    }
}
