// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Federated credential payloads and naming helpers

use crate::constants::identity::TOKEN_EXCHANGE_AUDIENCE;
use serde::{Deserialize, Serialize};

/// Location of a federated credential on a managed identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRef {
    /// Name of the federated credential
    pub name: String,
    /// Name of the user-assigned managed identity
    pub identity: String,
    pub resource_group: String,
}

impl CredentialRef {
    pub fn new(
        name: impl Into<String>,
        identity: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            identity: identity.into(),
            resource_group: resource_group.into(),
        }
    }
}

/// Claims a token must carry to be exchanged for the managed identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedCredential {
    pub issuer: String,
    pub subject: String,
    pub audiences: Vec<String>,
}

impl FederatedCredential {
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>, audiences: Vec<String>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            audiences,
        }
    }

    /// Credential for a Kubernetes service account, trusted through the tenant's issuer
    pub fn for_service_account(tenant_id: &str, namespace: &str, service_account: &str) -> Self {
        Self::new(
            issuer_for_tenant(tenant_id),
            kubernetes_subject(namespace, service_account),
            vec![TOKEN_EXCHANGE_AUDIENCE.to_string()],
        )
    }

    /// Request body expected by Azure Resource Manager
    pub fn to_resource(&self) -> serde_json::Value {
        serde_json::json!({ "properties": self })
    }
}

/// Subject claim Kubernetes puts in service account tokens
pub fn kubernetes_subject(namespace: &str, service_account: &str) -> String {
    format!("system:serviceaccount:{}:{}", namespace, service_account)
}

pub fn issuer_for_tenant(tenant_id: &str) -> String {
    format!("https://sts.windows.net/{}/", tenant_id)
}
