// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery, secret storage and Config status persistence.

pub mod crd;
pub mod secrets;
pub mod status;

pub use crd::wait_for_samples_crd;
pub use secrets::{KubeSecretStore, SecretStore};
pub use status::{KubeStatusWriter, StatusWriter};
