// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request handlers for credential bindings and namespace deletion

use crate::context::AppContext;
use crate::deletion::DeletionStatus;
use crate::identity::{CredentialRef, FederatedCredential};
use crate::server::error::ApiError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct CreateBindingParams {
    pub fic_name: String,
    pub managed_identity: String,
    pub rg: String,
    pub namespace: String,
    pub service_account: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBindingParams {
    pub fic_name: String,
    pub rg: String,
    pub managed_identity: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNamespaceParams {
    pub namespace: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindingResponse {
    pub message: String,
    pub namespace: String,
    pub service_account: String,
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub async fn create_binding(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<CreateBindingParams>,
) -> Result<Json<BindingResponse>, ApiError> {
    require("fic_name", &params.fic_name)?;
    require("managed_identity", &params.managed_identity)?;
    require("rg", &params.rg)?;
    require("namespace", &params.namespace)?;
    require("service_account", &params.service_account)?;

    info!(
        "API: Creating FIC {} for {}/{}",
        params.fic_name, params.namespace, params.service_account
    );

    let target = CredentialRef::new(&params.fic_name, &params.managed_identity, &params.rg);
    let credential = FederatedCredential::for_service_account(
        &ctx.config.tenant_id,
        &params.namespace,
        &params.service_account,
    );

    ctx.identity
        .create_binding(&target, &credential)
        .await
        .map_err(|e| {
            error!("Failed to create FIC {}: {}", params.fic_name, e);
            ApiError::from(e)
        })?;

    Ok(Json(BindingResponse {
        message: "FIC created successfully".to_string(),
        namespace: params.namespace,
        service_account: params.service_account,
    }))
}

/// The response reuses the create shape: `namespace` carries the credential name and
/// `service_account` the managed identity.
pub async fn delete_binding(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<DeleteBindingParams>,
) -> Result<Json<BindingResponse>, ApiError> {
    require("fic_name", &params.fic_name)?;
    require("managed_identity", &params.managed_identity)?;
    require("rg", &params.rg)?;

    info!(
        "API: Deleting FIC {} from {}/{}",
        params.fic_name, params.rg, params.managed_identity
    );

    let target = CredentialRef::new(&params.fic_name, &params.managed_identity, &params.rg);
    ctx.identity.delete_binding(&target).await.map_err(|e| {
        error!("Failed to delete FIC {}: {}", params.fic_name, e);
        ApiError::from(e)
    })?;

    Ok(Json(BindingResponse {
        message: "FIC deleted successfully".to_string(),
        namespace: params.fic_name,
        service_account: params.managed_identity,
    }))
}

pub async fn delete_namespace(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<DeleteNamespaceParams>,
) -> Result<(StatusCode, Json<DeletionStatus>), ApiError> {
    info!("API: Deleting namespace {}", params.namespace);

    // Runs detached from the request so a dropped connection cannot abort it mid-way
    let deleter = ctx.deleter.clone();
    let name = params.namespace.clone();
    let report = tokio::spawn(async move { deleter.delete_namespace(&name).await })
        .await
        .map_err(|e| {
            error!("Deletion task for namespace {} failed: {}", params.namespace, e);
            ApiError::InternalServerError(format!(
                "deletion of namespace {} did not complete",
                params.namespace
            ))
        })?
        .map_err(|e| {
            error!("Failed to delete namespace {}: {}", params.namespace, e);
            ApiError::from(e)
        })?;

    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(report.status())))
}
