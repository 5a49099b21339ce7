// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplesError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("secret {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    #[error("secret {namespace}/{name} already exists")]
    AlreadyExists { namespace: String, name: String },

    #[error("the samples credential was created/updated in the {namespace} namespace without the version annotation")]
    MissingVersionAnnotation { namespace: String },

    #[error("Cannot create rhel imagestreams to registry.redhat.io without the credentials being available")]
    MissingCredential,

    #[error("samples config {name} was modified concurrently")]
    Conflict { name: String },

    #[error("Failed to serialize status: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SamplesError {
    pub fn not_found(namespace: &str, name: &str) -> Self {
        SamplesError::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn already_exists(namespace: &str, name: &str) -> Self {
        SamplesError::AlreadyExists {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SamplesError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, SamplesError::AlreadyExists { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SamplesError::Conflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, SamplesError>;
