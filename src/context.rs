// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Process-wide dependencies, built once at startup and shared by every request.

use crate::config::{Config, DeletionConfig};
use crate::constants::SERVICE_NAME;
use crate::deletion::NamespaceDeleter;
use crate::identity::{ArmIdentityClient, IdentityApi, WorkloadIdentityCredential};
use crate::kubernetes::KubeNamespaces;
use crate::poll::TokioClock;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;

pub struct AppContext {
    pub config: Config,
    pub deleter: NamespaceDeleter,
    pub identity: Arc<dyn IdentityApi>,
}

impl AppContext {
    pub fn new(config: Config, deleter: NamespaceDeleter, identity: Arc<dyn IdentityApi>) -> Self {
        Self {
            config,
            deleter,
            identity,
        }
    }

    /// Wire up the Kubernetes and Azure clients for a running service
    pub fn from_config(config: Config, client: Client) -> Result<Self> {
        let deleter = namespace_deleter(&config.deletion, client);

        let http = reqwest::Client::builder()
            .user_agent(SERVICE_NAME)
            .build()
            .context("Failed to build HTTP client")?;
        let credential = WorkloadIdentityCredential::from_env(http.clone(), &config.tenant_id)
            .context("Failed to configure workload identity credential")?;
        let identity = ArmIdentityClient::new(
            http,
            config.arm_endpoint.clone(),
            config.subscription_id.clone(),
            Arc::new(credential),
        );

        Ok(Self::new(config, deleter, Arc::new(identity)))
    }
}

/// Namespace deleter backed by the cluster and the wall clock
pub fn namespace_deleter(config: &DeletionConfig, client: Client) -> NamespaceDeleter {
    NamespaceDeleter::new(
        Arc::new(KubeNamespaces::new(client)),
        Arc::new(TokioClock),
        config.delete_policy(),
        config.force_policy(),
    )
}
