// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret watcher - forwards events for the pull secret and its mirror to the sync manager.

use crate::constants::{mirror, source};
use crate::sync::{SecretEvent, SyncManagerHandle};
use futures::{stream::BoxStream, StreamExt};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, ResourceExt};
use kube_runtime::{watcher, WatchStreamExt};
use tracing::{debug, info, warn};

pub struct SecretReconciler {
    client: Client,
    sync_handle: SyncManagerHandle,
}

impl SecretReconciler {
    pub fn new(client: Client, sync_handle: SyncManagerHandle) -> Self {
        Self { client, sync_handle }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            "Watching secrets {}/{} and {}/{}",
            source::NAMESPACE,
            source::SECRET_NAME,
            mirror::NAMESPACE,
            mirror::SECRET_NAME
        );

        // The controller runtime hides deletions, so the raw watch streams are used
        let mut events = futures::stream::select(
            watch_secret(self.client.clone(), source::NAMESPACE, source::SECRET_NAME),
            watch_secret(self.client.clone(), mirror::NAMESPACE, mirror::SECRET_NAME),
        );

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if let Some(secret_event) = to_secret_event(event) {
                        debug!(
                            "Secret {}/{} changed, deleted: {}",
                            secret_event.secret.namespace().unwrap_or_default(),
                            secret_event.secret.name_any(),
                            secret_event.deleted
                        );
                        self.sync_handle.send(secret_event).await;
                    }
                }
                Err(e) => warn!("Secret watch error: {}", e),
            }
        }

        Ok(())
    }
}

fn watch_secret(
    client: Client,
    namespace: &str,
    name: &str,
) -> BoxStream<'static, Result<watcher::Event<Secret>, watcher::Error>> {
    let secrets: Api<Secret> = Api::namespaced(client, namespace);
    let config = watcher::Config::default().fields(&format!("metadata.name={}", name));
    watcher(secrets, config).default_backoff().boxed()
}

fn to_secret_event(event: watcher::Event<Secret>) -> Option<SecretEvent> {
    match event {
        watcher::Event::Apply(secret) | watcher::Event::InitApply(secret) => {
            Some(SecretEvent::applied(secret))
        }
        watcher::Event::Delete(secret) => Some(SecretEvent::deleted(secret)),
        watcher::Event::Init | watcher::Event::InitDone => None,
    }
}
