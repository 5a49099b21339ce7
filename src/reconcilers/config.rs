// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Config reconciler - holds back samples processing until the registry credential exists.

use crate::constants::DEFAULT_RETRY_DELAY_SECS;
use crate::error::{Result, SamplesError};
use crate::kubernetes::StatusWriter;
use crate::sync::waiting_for_credential;
use crate::types::samples_config::SamplesConfig;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct ConfigReconciler {
    client: Client,
    status_writer: Arc<dyn StatusWriter>,
    config_name: String,
}

impl ConfigReconciler {
    pub fn new(client: Client, status_writer: Arc<dyn StatusWriter>, config_name: String) -> Self {
        Self {
            client,
            status_writer,
            config_name,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let configs: Api<SamplesConfig> = Api::all(self.client.clone());
        let watcher_config =
            watcher::Config::default().fields(&format!("metadata.name={}", self.config_name));
        let context = Arc::new(self);

        Controller::new(configs, watcher_config)
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled samples config: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(samples: Arc<SamplesConfig>, ctx: Arc<ConfigReconciler>) -> Result<Action> {
    let name = samples.name_any();
    debug!("Reconciling samples config: {}", name);

    let mut samples = (*samples).clone();
    let gate = waiting_for_credential(&mut samples);

    if gate.flush {
        info!("CRDUPDATE cred does not exist for samples config {}", name);
        ctx.status_writer.update_status(&samples).await?;
    }
    if gate.block {
        info!(
            "Samples config {} is waiting for the registry credential",
            name
        );
    }

    // The secret watch updates the condition once the credential appears, which
    // triggers another reconcile
    Ok(Action::await_change())
}

fn error_policy(
    _samples: Arc<SamplesConfig>,
    error: &SamplesError,
    _ctx: Arc<ConfigReconciler>,
) -> Action {
    if error.is_conflict() {
        // reconciled from a stale copy; the newer object gets another pass
        debug!("{}, requeueing", error);
        return Action::requeue(Duration::from_secs(DEFAULT_RETRY_DELAY_SECS));
    }
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}
