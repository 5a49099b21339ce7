// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Copying of the cluster pull secret into the operator namespace

use crate::constants::{annotations, mirror, source};
use crate::error::Result;
use crate::kubernetes::SecretStore;
use k8s_openapi::api::core::v1::Secret;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorResult {
    Created,
    Updated,
    /// The store returned no source secret and no error
    NothingToCopy,
}

/// Keeps `openshift/samples-registry-credentials` in line with the cluster pull secret
pub struct CredentialMirror {
    store: Arc<dyn SecretStore>,
    version: String,
}

impl CredentialMirror {
    pub fn new(store: Arc<dyn SecretStore>, version: impl Into<String>) -> Self {
        Self {
            store,
            version: version.into(),
        }
    }

    pub fn store(&self) -> &dyn SecretStore {
        self.store.as_ref()
    }

    /// Copy the default pull secret into the mirror slot.
    ///
    /// Without a `source`, the pull secret is fetched from `kube-system`; a missing
    /// pull secret is returned as `NotFound` for the caller to interpret. An
    /// existing mirror is overwritten.
    #[instrument(skip(self, source_secret))]
    pub async fn copy_default_pull_secret(
        &self,
        source_secret: Option<&Secret>,
    ) -> Result<MirrorResult> {
        let fetched;
        let secret = match source_secret {
            Some(secret) => secret,
            None => match self.store.get(source::NAMESPACE, source::SECRET_NAME).await? {
                Some(secret) => {
                    fetched = secret;
                    &fetched
                }
                None => {
                    debug!("No pull secret to copy yet");
                    return Ok(MirrorResult::NothingToCopy);
                }
            },
        };

        info!(
            "Copying secret {} from the {} namespace into the operator's namespace",
            source::SECRET_NAME,
            source::NAMESPACE
        );

        let to_create = mirror_secret_from(secret, &self.version);
        match self.store.create(mirror::NAMESPACE, &to_create).await {
            Ok(_) => Ok(MirrorResult::Created),
            Err(e) if e.is_already_exists() => {
                debug!("Mirror secret already exists, updating it");
                self.store.update(mirror::NAMESPACE, &to_create).await?;
                Ok(MirrorResult::Updated)
            }
            Err(e) => Err(e),
        }
    }
}

/// Build the mirror secret from the source, dropping server-populated metadata and
/// replacing all annotations with the version stamp
fn mirror_secret_from(secret: &Secret, version: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(mirror::SECRET_NAME.to_string()),
            namespace: Some(mirror::NAMESPACE.to_string()),
            labels: secret.metadata.labels.clone(),
            annotations: Some(BTreeMap::from([(
                annotations::SAMPLES_VERSION.to_string(),
                version.to_string(),
            )])),
            ..Default::default()
        },
        data: secret.data.clone(),
        string_data: secret.string_data.clone(),
        type_: secret.type_.clone(),
        immutable: secret.immutable,
    }
}
