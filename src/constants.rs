// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by the samples operator
pub mod annotations {
    /// Stamped on every secret the operator writes into the mirror slot
    pub const SAMPLES_VERSION: &str = "samples.operator.openshift.io/version";
}

/// The cluster-wide default pull secret
pub mod source {
    pub const NAMESPACE: &str = "kube-system";
    pub const SECRET_NAME: &str = "coreos-pull-secret";
}

/// The operator-managed copy of the pull secret
pub mod mirror {
    pub const NAMESPACE: &str = "openshift";
    pub const SECRET_NAME: &str = "samples-registry-credentials";
}

/// Condition types owned by the credential sync
pub mod conditions {
    pub const IMPORT_CREDENTIALS_EXIST: &str = "ImportCredentialsExist";
}

/// Registry that requires the pull credential for rhel content
pub const REDHAT_REGISTRY: &str = "registry.redhat.io";

/// Name of the samples Config resource the operator manages
pub const DEFAULT_CONFIG_NAME: &str = "cluster";

/// Number of times an unconfirmed mirror deletion is retried before acting on it
pub const DEFAULT_SECRET_RETRY_LIMIT: u32 = 3;

/// Delay before a retried secret event is redelivered
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
