// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{DEFAULT_CONFIG_NAME, DEFAULT_RETRY_DELAY_SECS, DEFAULT_SECRET_RETRY_LIMIT};
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Version stamped on the mirrored credential
    pub version: String,
    /// Name of the cluster-scoped samples Config resource
    pub config_name: String,
    pub secret_retry_limit: u32,
    pub retry_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let version = env::var("RELEASE_VERSION")
            .context("RELEASE_VERSION environment variable not set")?;
        let config_name =
            env::var("SAMPLES_CONFIG_NAME").unwrap_or_else(|_| DEFAULT_CONFIG_NAME.to_string());

        let secret_retry_limit = match env::var("SECRET_RETRY_LIMIT") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("invalid SECRET_RETRY_LIMIT: {}", v))?,
            Err(_) => DEFAULT_SECRET_RETRY_LIMIT,
        };
        let retry_delay_secs = match env::var("RETRY_DELAY_SECS") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("invalid RETRY_DELAY_SECS: {}", v))?,
            Err(_) => DEFAULT_RETRY_DELAY_SECS,
        };

        Ok(Config {
            version,
            config_name,
            secret_retry_limit,
            retry_delay: Duration::from_secs(retry_delay_secs),
        })
    }
}
