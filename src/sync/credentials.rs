// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret event handling for the samples registry credential.
//!
//! Every watch event on the cluster pull secret or its mirror is first reduced to
//! an [`EventFacts`] snapshot, classified into a [`Transition`] by the pure
//! [`classify`] function, and then applied by [`SecretEventReconciler`]. The
//! `ImportCredentialsExist` condition is only flushed to the cluster when it
//! changed or an error was reported.

use crate::constants::{annotations, conditions::IMPORT_CREDENTIALS_EXIST, mirror, source};
use crate::error::{Result, SamplesError};
use crate::kubernetes::StatusWriter;
use crate::sync::mirror::{CredentialMirror, MirrorResult};
use crate::sync::upserts::UpsertGate;
use crate::types::samples_config::{ConditionStatus, ManagementState, SamplesConfig};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The two secrets the operator cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretIdentity {
    /// `kube-system/coreos-pull-secret`
    Source,
    /// `openshift/samples-registry-credentials`
    Mirror,
}

impl SecretIdentity {
    pub fn of(secret: &Secret) -> Option<Self> {
        let name = secret.metadata.name.as_deref();
        let namespace = secret.metadata.namespace.as_deref();
        match (namespace, name) {
            (Some(source::NAMESPACE), Some(source::SECRET_NAME)) => Some(SecretIdentity::Source),
            (Some(mirror::NAMESPACE), Some(mirror::SECRET_NAME)) => Some(SecretIdentity::Mirror),
            _ => None,
        }
    }
}

/// A watch notification for one of the credential secrets
#[derive(Debug, Clone)]
pub struct SecretEvent {
    pub secret: Secret,
    pub deleted: bool,
}

impl SecretEvent {
    pub fn applied(secret: Secret) -> Self {
        Self {
            secret,
            deleted: false,
        }
    }

    pub fn deleted(secret: Secret) -> Self {
        Self {
            secret,
            deleted: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// A sample upsert cycle is writing the Config status
    UpsertInProgress,
    /// The mirror was deleted while credentials were reported present; wait to see
    /// whether the deletion was the operator's own
    MirrorDeletionUnconfirmed { attempt: u32 },
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryReason::UpsertInProgress => {
                write!(f, "retry secret event because in the middle of a sample upsert cycle")
            }
            RetryReason::MirrorDeletionUnconfirmed { attempt } => write!(
                f,
                "retry {} on credential deletion in the {} namespace to make sure the operator deleted it",
                attempt,
                mirror::NAMESPACE
            ),
        }
    }
}

/// Result of processing one secret event. `Retry` asks the caller to redeliver the
/// event later; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretEventOutcome {
    /// The event was not acted upon
    Ignored,
    /// The event was handled and the condition did not change
    Unchanged,
    /// The condition changed or an error was reported, and the status was written
    StatusFlushed,
    Retry(RetryReason),
}

impl SecretEventOutcome {
    pub fn is_retry(&self) -> bool {
        matches!(self, SecretEventOutcome::Retry(_))
    }
}

/// Everything the decision depends on, captured before any side effect
#[derive(Debug, Clone)]
pub struct EventFacts<'a> {
    pub in_flight_upserts: usize,
    pub management_state: &'a ManagementState,
    pub identity: Option<SecretIdentity>,
    pub deleted: bool,
    /// The secret carries the samples version annotation
    pub stamped: bool,
    /// `ImportCredentialsExist` is currently True
    pub credentials_exist: bool,
    pub retry_count: u32,
    pub retry_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Busy,
    IgnoreUnmanaged,
    IgnoreIrrelevant,
    /// Our own write to the mirror echoed back by the watch
    AcknowledgeOwnWrite,
    /// Someone else wrote the mirror without the version stamp
    RejectUnstampedMirror,
    RetryMirrorDeletion,
    /// Mirror deletion while Removed is final
    AcceptMirrorDeletion,
    IgnoreWhileRemoved,
    ManageCredential,
}

pub fn classify(facts: &EventFacts<'_>) -> Transition {
    if facts.in_flight_upserts > 0 {
        return Transition::Busy;
    }

    let removed = match facts.management_state {
        ManagementState::Unmanaged => return Transition::IgnoreUnmanaged,
        ManagementState::Removed => true,
        ManagementState::Managed | ManagementState::Unrecognized(_) => false,
    };

    let Some(identity) = facts.identity else {
        return Transition::IgnoreIrrelevant;
    };

    if identity == SecretIdentity::Mirror {
        if !facts.deleted {
            return if facts.stamped {
                Transition::AcknowledgeOwnWrite
            } else {
                Transition::RejectUnstampedMirror
            };
        }
        if facts.credentials_exist && facts.retry_count < facts.retry_limit {
            return Transition::RetryMirrorDeletion;
        }
        if removed {
            return Transition::AcceptMirrorDeletion;
        }
    }

    if removed {
        return Transition::IgnoreWhileRemoved;
    }
    Transition::ManageCredential
}

fn is_stamped(secret: &Secret) -> bool {
    secret
        .metadata
        .annotations
        .as_ref()
        .is_some_and(|a| a.contains_key(annotations::SAMPLES_VERSION))
}

/// Sequential processor of credential secret events.
///
/// Holds the unconfirmed-deletion retry counter; one instance must see events one
/// at a time.
pub struct SecretEventReconciler {
    mirror: CredentialMirror,
    status_writer: Arc<dyn StatusWriter>,
    upserts: Arc<dyn UpsertGate>,
    retry_limit: u32,
    secret_retry_count: u32,
}

impl SecretEventReconciler {
    pub fn new(
        mirror: CredentialMirror,
        status_writer: Arc<dyn StatusWriter>,
        upserts: Arc<dyn UpsertGate>,
        retry_limit: u32,
    ) -> Self {
        Self {
            mirror,
            status_writer,
            upserts,
            retry_limit,
            secret_retry_count: 0,
        }
    }

    pub fn secret_retry_count(&self) -> u32 {
        self.secret_retry_count
    }

    #[instrument(
        skip(self, config, event),
        fields(
            secret = %format!("{}/{}", event.secret.namespace().unwrap_or_default(), event.secret.name_any()),
            deleted = event.deleted
        )
    )]
    pub async fn process_secret_event(
        &mut self,
        config: &mut SamplesConfig,
        event: &SecretEvent,
    ) -> Result<SecretEventOutcome> {
        let facts = EventFacts {
            in_flight_upserts: self.upserts.in_flight_count(),
            management_state: &config.spec.management_state,
            identity: SecretIdentity::of(&event.secret),
            deleted: event.deleted,
            stamped: is_stamped(&event.secret),
            credentials_exist: config.condition_true(IMPORT_CREDENTIALS_EXIST),
            retry_count: self.secret_retry_count,
            retry_limit: self.retry_limit,
        };
        let transition = classify(&facts);
        log_management_state(&facts, transition);

        if !matches!(transition, Transition::Busy | Transition::RetryMirrorDeletion) {
            self.secret_retry_count = 0;
        }

        match transition {
            Transition::Busy => Ok(SecretEventOutcome::Retry(RetryReason::UpsertInProgress)),
            Transition::IgnoreUnmanaged | Transition::IgnoreIrrelevant => {
                Ok(SecretEventOutcome::Ignored)
            }
            Transition::AcknowledgeOwnWrite => {
                info!("creation/update of credential in openshift namespace recognized");
                if config.condition_true(IMPORT_CREDENTIALS_EXIST) {
                    return Ok(SecretEventOutcome::Unchanged);
                }
                config.good_condition_update(IMPORT_CREDENTIALS_EXIST, ConditionStatus::True);
                info!("CRDUPDATE switching import cred to true following openshift namespace event");
                self.flush(config).await
            }
            Transition::RejectUnstampedMirror => {
                let err = SamplesError::MissingVersionAnnotation {
                    namespace: mirror::NAMESPACE.to_string(),
                };
                warn!("{}", err);
                config.report_condition_error(
                    IMPORT_CREDENTIALS_EXIST,
                    ConditionStatus::Unknown,
                    &err.to_string(),
                );
                self.flush(config).await
            }
            Transition::RetryMirrorDeletion => {
                self.secret_retry_count += 1;
                let reason = RetryReason::MirrorDeletionUnconfirmed {
                    attempt: self.secret_retry_count,
                };
                debug!("{}", reason);
                Ok(SecretEventOutcome::Retry(reason))
            }
            Transition::AcceptMirrorDeletion => {
                info!("deletion of credential in openshift namespace for removed state recognized");
                config.good_condition_update(IMPORT_CREDENTIALS_EXIST, ConditionStatus::False);
                info!("CRDUPDATE secret deletion recognized");
                self.flush(config).await
            }
            Transition::IgnoreWhileRemoved => {
                debug!("Ignoring stray secret event while in removed state");
                Ok(SecretEventOutcome::Ignored)
            }
            Transition::ManageCredential => self.apply_manage_credential(config, event).await,
        }
    }

    async fn apply_manage_credential(
        &self,
        config: &mut SamplesConfig,
        event: &SecretEvent,
    ) -> Result<SecretEventOutcome> {
        let before = config.condition(IMPORT_CREDENTIALS_EXIST).status;

        if let Err(e) = self
            .manage_credential(event.deleted, config, &event.secret)
            .await
        {
            warn!("Failed to manage registry credential: {}", e);
            config.report_condition_error(
                IMPORT_CREDENTIALS_EXIST,
                ConditionStatus::Unknown,
                &e.to_string(),
            );
            info!("CRDUPDATE event secret update error");
            return self.flush(config).await;
        }

        if config.condition(IMPORT_CREDENTIALS_EXIST).status == before {
            return Ok(SecretEventOutcome::Unchanged);
        }
        info!("CRDUPDATE event secret update");
        self.flush(config).await
    }

    /// Copy, recreate or delete the mirror in reaction to an event and record the
    /// result on the condition. Events for unrelated secrets are ignored.
    pub async fn manage_credential(
        &self,
        deleted: bool,
        config: &mut SamplesConfig,
        secret: &Secret,
    ) -> Result<()> {
        match SecretIdentity::of(secret) {
            None => Ok(()),
            Some(SecretIdentity::Mirror) => {
                if !deleted {
                    return Ok(());
                }
                // always keep a mirror around, so recreate it from the pull secret
                match self.mirror.copy_default_pull_secret(None).await {
                    Ok(MirrorResult::NothingToCopy) => Ok(()),
                    Ok(_) => {
                        config.good_condition_update(IMPORT_CREDENTIALS_EXIST, ConditionStatus::True);
                        Ok(())
                    }
                    Err(e) if e.is_not_found() => {
                        // pull secret is gone too; it is copied again when it comes back
                        config.good_condition_update(IMPORT_CREDENTIALS_EXIST, ConditionStatus::False);
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Some(SecretIdentity::Source) => {
                if deleted {
                    match self
                        .mirror
                        .store()
                        .delete(mirror::NAMESPACE, mirror::SECRET_NAME)
                        .await
                    {
                        Ok(()) => {}
                        Err(e) if e.is_not_found() => {}
                        Err(e) => return Err(e),
                    }
                    info!(
                        "registry dockerconfig secret {}/{} was deleted so deleted secret {} in the {} namespace",
                        source::NAMESPACE,
                        source::SECRET_NAME,
                        mirror::SECRET_NAME,
                        mirror::NAMESPACE
                    );
                    config.good_condition_update(IMPORT_CREDENTIALS_EXIST, ConditionStatus::False);
                    return Ok(());
                }
                self.mirror.copy_default_pull_secret(Some(secret)).await?;
                config.good_condition_update(IMPORT_CREDENTIALS_EXIST, ConditionStatus::True);
                Ok(())
            }
        }
    }

    async fn flush(&self, config: &SamplesConfig) -> Result<SecretEventOutcome> {
        self.status_writer.update_status(config).await?;
        Ok(SecretEventOutcome::StatusFlushed)
    }
}

fn log_management_state(facts: &EventFacts<'_>, transition: Transition) {
    if transition == Transition::Busy {
        debug!("Deferring secret event while a sample upsert cycle is in flight");
        return;
    }
    match facts.management_state {
        ManagementState::Unmanaged => {
            debug!("Ignoring secret event because samples resource is in unmanaged state")
        }
        ManagementState::Removed => info!(
            "processing secret watch event while in Removed state; deletion event: {}",
            facts.deleted
        ),
        ManagementState::Managed => info!(
            "processing secret watch event while in Managed state; deletion event: {}",
            facts.deleted
        ),
        ManagementState::Unrecognized(state) => info!(
            "processing secret watch event like we are in Managed state, even though it is set to {}; deletion event: {}",
            state, facts.deleted
        ),
    }
}

/// Decision of the Config reconcile cycle on whether to hold back content creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialGate {
    /// Stop processing the Config until the credential shows up
    pub block: bool,
    /// The condition was updated and the status must be written
    pub flush: bool,
}

/// Decide whether processing of the Config must wait for the pull credential.
///
/// rhel content from registry.redhat.io cannot be imported without the credential.
/// The missing-credential error is only recorded once; later calls block without
/// asking for another status write.
pub fn waiting_for_credential(config: &mut SamplesConfig) -> CredentialGate {
    if !config.cluster_needs_creds() {
        return CredentialGate::default();
    }

    let cred = config.condition(IMPORT_CREDENTIALS_EXIST);
    if cred.status == ConditionStatus::True {
        return CredentialGate::default();
    }
    if !cred.message.is_empty() {
        return CredentialGate {
            block: true,
            flush: false,
        };
    }

    let err = SamplesError::MissingCredential;
    warn!("{}", err);
    config.report_condition_error(
        IMPORT_CREDENTIALS_EXIST,
        ConditionStatus::False,
        &err.to_string(),
    );
    CredentialGate {
        block: true,
        flush: true,
    }
}
