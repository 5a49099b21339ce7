// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::REDHAT_REGISTRY;
use chrono::{DateTime, Utc};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "samples.operator.openshift.io",
    version = "v1",
    kind = "Config"
)]
#[kube(status = "SamplesConfigStatus")]
#[serde(rename_all = "camelCase")]
pub struct ConfigSpec {
    #[serde(default)]
    #[schemars(with = "String")]
    pub management_state: ManagementState,
    #[serde(default)]
    pub install_type: InstallType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples_registry: Option<String>,
}

/// The cluster-scoped samples `Config` resource
pub type SamplesConfig = Config;
pub type SamplesConfigSpec = ConfigSpec;

/// Operator management mode, as set by the cluster admin.
///
/// Values other than the three known ones are kept verbatim so they can be
/// logged, and are otherwise treated like `Managed`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ManagementState {
    #[default]
    Managed,
    Unmanaged,
    Removed,
    Unrecognized(String),
}

impl From<String> for ManagementState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Managed" => ManagementState::Managed,
            "Unmanaged" => ManagementState::Unmanaged,
            "Removed" => ManagementState::Removed,
            _ => ManagementState::Unrecognized(value),
        }
    }
}

impl From<ManagementState> for String {
    fn from(value: ManagementState) -> Self {
        match value {
            ManagementState::Managed => "Managed".to_string(),
            ManagementState::Unmanaged => "Unmanaged".to_string(),
            ManagementState::Removed => "Removed".to_string(),
            ManagementState::Unrecognized(s) => s,
        }
    }
}

impl std::fmt::Display for ManagementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManagementState::Managed => write!(f, "Managed"),
            ManagementState::Unmanaged => write!(f, "Unmanaged"),
            ManagementState::Removed => write!(f, "Removed"),
            ManagementState::Unrecognized(s) => write!(f, "{}", s),
        }
    }
}

/// Content distribution installed by the operator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstallType {
    #[default]
    Centos,
    Rhel,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SamplesConfigStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<SamplesConfigCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SamplesConfigCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl SamplesConfig {
    /// Whether the selected distribution pulls from a registry that requires the
    /// cluster pull credential
    pub fn cluster_needs_creds(&self) -> bool {
        if self.spec.install_type != InstallType::Rhel {
            return false;
        }
        match self.spec.samples_registry.as_deref() {
            None | Some("") => true,
            Some(registry) => registry == REDHAT_REGISTRY,
        }
    }
}
