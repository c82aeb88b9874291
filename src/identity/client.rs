// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Azure Resource Manager client for federated identity credentials

use crate::constants::identity::MSI_API_VERSION;
use crate::error::IdentityError;
use crate::identity::{CredentialRef, FederatedCredential, IdentityApi, TokenProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use url::Url;

#[derive(Deserialize)]
struct ArmErrorBody {
    error: ArmErrorDetail,
}

#[derive(Deserialize)]
struct ArmErrorDetail {
    message: String,
}

pub struct ArmIdentityClient {
    http: reqwest::Client,
    endpoint: Url,
    subscription_id: String,
    credential: Arc<dyn TokenProvider>,
}

impl ArmIdentityClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        subscription_id: impl Into<String>,
        credential: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            endpoint,
            subscription_id: subscription_id.into(),
            credential,
        }
    }

    fn credential_url(&self, target: &CredentialRef) -> Result<Url, IdentityError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend([
                "subscriptions",
                self.subscription_id.as_str(),
                "resourceGroups",
                target.resource_group.as_str(),
                "providers",
                "Microsoft.ManagedIdentity",
                "userAssignedIdentities",
                target.identity.as_str(),
                "federatedIdentityCredentials",
                target.name.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("api-version", MSI_API_VERSION);
        Ok(url)
    }
}

/// Map a non-success ARM response onto an [`IdentityError`]
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ArmErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    Err(match status.as_u16() {
        404 => IdentityError::NotFound(message),
        409 => IdentityError::Conflict(message),
        code => IdentityError::Api {
            status: code,
            message,
        },
    })
}

#[async_trait]
impl IdentityApi for ArmIdentityClient {
    #[instrument(skip(self, credential), fields(subject = %credential.subject))]
    async fn create_binding(
        &self,
        target: &CredentialRef,
        credential: &FederatedCredential,
    ) -> Result<(), IdentityError> {
        let url = self.credential_url(target)?;
        let token = self.credential.token().await?;

        info!(
            "Creating federated credential {} on identity {}/{}",
            target.name, target.resource_group, target.identity
        );
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&credential.to_resource())
            .send()
            .await?;
        check_response(response).await?;

        info!("Federated credential {} created", target.name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_binding(&self, target: &CredentialRef) -> Result<(), IdentityError> {
        let url = self.credential_url(target)?;
        let token = self.credential.token().await?;

        info!(
            "Deleting federated credential {} from identity {}/{}",
            target.name, target.resource_group, target.identity
        );
        let response = self.http.delete(url).bearer_auth(token).send().await?;
        check_response(response).await?;

        info!("Federated credential {} deleted", target.name);
        Ok(())
    }
}
