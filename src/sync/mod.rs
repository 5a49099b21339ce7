// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry credential mirroring and the secret event state machine.

pub mod credentials;
pub mod manager;
pub mod mirror;
pub mod upserts;

pub use credentials::{
    waiting_for_credential, CredentialGate, SecretEvent, SecretEventOutcome,
    SecretEventReconciler,
};
pub use manager::{CredentialSyncManager, SyncManagerHandle};
pub use mirror::CredentialMirror;
pub use upserts::{UpsertCounter, UpsertGate};
