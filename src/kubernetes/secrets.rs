// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret storage capability and its Kubernetes implementation

use crate::error::{Result, SamplesError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, instrument};

/// Get/create/update/delete access to secrets keyed by namespace and name.
///
/// `get` and `delete` report an absent secret as [`SamplesError::NotFound`];
/// `create` reports a conflicting object as [`SamplesError::AlreadyExists`].
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    async fn create(&self, namespace: &str, secret: &Secret) -> Result<Secret>;

    async fn update(&self, namespace: &str, secret: &Secret) -> Result<Secret>;

    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Translate API status codes into the error kinds callers branch on
fn map_api_error(err: kube::Error, namespace: &str, name: &str) -> SamplesError {
    match err {
        kube::Error::Api(resp) if resp.code == 404 => SamplesError::not_found(namespace, name),
        kube::Error::Api(resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
            SamplesError::already_exists(namespace, name)
        }
        e => SamplesError::KubeError(e),
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    #[instrument(skip(self))]
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        let secret = self
            .api(namespace)
            .get(name)
            .await
            .map_err(|e| map_api_error(e, namespace, name))?;
        Ok(Some(secret))
    }

    #[instrument(skip(self, secret), fields(name = %secret.name_any()))]
    async fn create(&self, namespace: &str, secret: &Secret) -> Result<Secret> {
        let name = secret.name_any();
        let created = self
            .api(namespace)
            .create(&PostParams::default(), secret)
            .await
            .map_err(|e| map_api_error(e, namespace, &name))?;
        debug!("Created secret {}/{}", namespace, name);
        Ok(created)
    }

    #[instrument(skip(self, secret), fields(name = %secret.name_any()))]
    async fn update(&self, namespace: &str, secret: &Secret) -> Result<Secret> {
        let name = secret.name_any();
        let updated = self
            .api(namespace)
            .replace(&name, &PostParams::default(), secret)
            .await
            .map_err(|e| map_api_error(e, namespace, &name))?;
        debug!("Updated secret {}/{}", namespace, name);
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| map_api_error(e, namespace, name))?;
        debug!("Deleted secret {}/{}", namespace, name);
        Ok(())
    }
}
