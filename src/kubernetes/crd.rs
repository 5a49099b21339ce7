// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::samples_config::SamplesConfig;
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Wait for the samples Config CRD to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_samples_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;
    let group = SamplesConfig::group(&());

    loop {
        match check_samples_crd_exists(client).await {
            Ok(true) => {
                info!("Config CRD ({}/v1) is available", group);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "Config CRD ({}/v1) not yet available, waiting {} seconds...",
                    group, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for Config CRD: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if the Config CRD exists by attempting to discover it.
async fn check_samples_crd_exists(client: &Client) -> Result<bool> {
    let group = SamplesConfig::group(&());
    let discovery = Discovery::new(client.clone())
        .filter(&[&*group])
        .run()
        .await?;

    let found = discovery
        .groups()
        .filter(|g| g.name() == group)
        .flat_map(|g| g.recommended_resources())
        .any(|(ar, _)| {
            ar.kind == SamplesConfig::kind(&()) && ar.version == SamplesConfig::version(&())
        });
    Ok(found)
}
