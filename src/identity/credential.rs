// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Access tokens for Azure Resource Manager via workload identity.

use crate::constants::identity::{ARM_SCOPE, DEFAULT_AUTHORITY_HOST, TOKEN_REFRESH_MARGIN_SECS};
use crate::error::IdentityError;
use async_trait::async_trait;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;

const JWT_BEARER_ASSERTION: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Supplies bearer tokens for management API calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, IdentityError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Exchanges the projected service account token for an Azure AD access token.
pub struct WorkloadIdentityCredential {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    token_file: PathBuf,
    cached: Mutex<Option<CachedToken>>,
}

impl WorkloadIdentityCredential {
    pub fn new(
        http: reqwest::Client,
        authority_host: &Url,
        tenant_id: &str,
        client_id: impl Into<String>,
        token_file: impl Into<PathBuf>,
    ) -> Result<Self, IdentityError> {
        let token_url = authority_host.join(&format!("{}/oauth2/v2.0/token", tenant_id))?;

        Ok(Self {
            http,
            token_url,
            client_id: client_id.into(),
            token_file: token_file.into(),
            cached: Mutex::new(None),
        })
    }

    /// Build from the variables the workload identity webhook injects into the pod
    pub fn from_env(http: reqwest::Client, tenant_id: &str) -> Result<Self, IdentityError> {
        let client_id = env::var("AZURE_CLIENT_ID").map_err(|_| {
            IdentityError::Credential("AZURE_CLIENT_ID environment variable not set".to_string())
        })?;
        let token_file = env::var("AZURE_FEDERATED_TOKEN_FILE").map_err(|_| {
            IdentityError::Credential(
                "AZURE_FEDERATED_TOKEN_FILE environment variable not set".to_string(),
            )
        })?;
        let authority_host: Url = env::var("AZURE_AUTHORITY_HOST")
            .unwrap_or_else(|_| DEFAULT_AUTHORITY_HOST.to_string())
            .parse()?;

        Self::new(http, &authority_host, tenant_id, client_id, token_file)
    }

    async fn fetch(&self) -> Result<TokenResponse, IdentityError> {
        let assertion = tokio::fs::read_to_string(&self.token_file)
            .await
            .map_err(|e| {
                IdentityError::Credential(format!(
                    "Failed to read federated token file {}: {}",
                    self.token_file.display(),
                    e
                ))
            })?;

        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("scope", ARM_SCOPE),
                ("client_assertion_type", JWT_BEARER_ASSERTION),
                ("client_assertion", assertion.trim()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Credential(format!(
                "Token request failed with status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TokenProvider for WorkloadIdentityCredential {
    #[instrument(skip(self), fields(client_id = %self.client_id))]
    async fn token(&self) -> Result<String, IdentityError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting management API token");
        let response = self.fetch().await?;
        let lifetime = Duration::from_secs(response.expires_in.saturating_sub(TOKEN_REFRESH_MARGIN_SECS));
        *cached = Some(CachedToken {
            value: response.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }
}
