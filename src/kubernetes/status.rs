// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persistence of the samples Config status

use crate::error::{Result, SamplesError};
use crate::types::samples_config::SamplesConfig;
use async_trait::async_trait;
use kube::{
    api::{Patch, PatchParams},
    Api, Client, ResourceExt,
};
use serde_json::json;
use tracing::{debug, instrument};

/// Writes the in-memory status of a Config back to the cluster.
///
/// The write is conditional on the resourceVersion the Config was read at, so
/// a writer working from a stale copy gets `SamplesError::Conflict` instead of
/// overwriting a newer condition.
#[async_trait]
pub trait StatusWriter: Send + Sync {
    async fn update_status(&self, config: &SamplesConfig) -> Result<()>;
}

pub struct KubeStatusWriter {
    client: Client,
}

impl KubeStatusWriter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusWriter for KubeStatusWriter {
    #[instrument(skip(self, config), fields(config = %config.name_any()))]
    async fn update_status(&self, config: &SamplesConfig) -> Result<()> {
        let configs: Api<SamplesConfig> = Api::all(self.client.clone());
        let name = config.name_any();

        configs
            .patch_status(&name, &PatchParams::default(), &Patch::Merge(&status_patch(config)))
            .await
            .map_err(|e| match e {
                kube::Error::Api(resp) if resp.code == 409 => SamplesError::Conflict {
                    name: name.clone(),
                },
                e => SamplesError::KubeError(e),
            })?;

        debug!("Status of config {} updated", name);
        Ok(())
    }
}

fn status_patch(config: &SamplesConfig) -> serde_json::Value {
    let mut patch = json!({ "status": config.status });
    if let Some(resource_version) = config.resource_version() {
        patch["metadata"] = json!({ "resourceVersion": resource_version });
    }
    patch
}
