// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{deletion, identity, DEFAULT_LISTEN_ADDR};
use crate::poll::RetryPolicy;
use anyhow::{bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub subscription_id: String,
    pub tenant_id: String,
    pub listen_addr: SocketAddr,
    /// Azure Resource Manager base URL
    pub arm_endpoint: Url,
    pub deletion: DeletionConfig,
}

/// Timing of namespace deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionConfig {
    pub poll_interval: Duration,
    pub delete_timeout: Duration,
    pub force_timeout: Duration,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(deletion::POLL_INTERVAL_SECS),
            delete_timeout: Duration::from_secs(deletion::DELETE_TIMEOUT_SECS),
            force_timeout: Duration::from_secs(deletion::FORCE_TIMEOUT_SECS),
        }
    }
}

impl DeletionConfig {
    /// Load only the deletion settings; no Azure variables are required
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(v) => v
                    .parse()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a whole number of seconds", key)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let poll_interval = seconds("NAMESPACE_POLL_INTERVAL_SECS", deletion::POLL_INTERVAL_SECS)?;
        if poll_interval.is_zero() {
            bail!("NAMESPACE_POLL_INTERVAL_SECS must be at least 1 second");
        }

        Ok(DeletionConfig {
            poll_interval,
            delete_timeout: seconds("NAMESPACE_DELETE_TIMEOUT_SECS", deletion::DELETE_TIMEOUT_SECS)?,
            force_timeout: seconds("NAMESPACE_FORCE_TIMEOUT_SECS", deletion::FORCE_TIMEOUT_SECS)?,
        })
    }

    /// Policy for the initial wait after the delete call
    pub fn delete_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.poll_interval, self.delete_timeout)
    }

    /// Policy for the wait after finalizers have been cleared
    pub fn force_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.poll_interval, self.force_timeout)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let subscription_id = lookup("AZURE_SUBSCRIPTION_ID")
            .context("AZURE_SUBSCRIPTION_ID environment variable not set")?;
        let tenant_id =
            lookup("AZURE_TENANT_ID").context("AZURE_TENANT_ID environment variable not set")?;

        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("LISTEN_ADDR is not a valid socket address")?;
        let arm_endpoint = lookup("ARM_ENDPOINT")
            .unwrap_or_else(|| identity::DEFAULT_ARM_ENDPOINT.to_string())
            .parse()
            .context("ARM_ENDPOINT is not a valid URL")?;

        Ok(Config {
            subscription_id,
            tenant_id,
            listen_addr,
            arm_endpoint,
            deletion: DeletionConfig::from_lookup(&lookup)?,
        })
    }
}
