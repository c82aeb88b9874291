// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{BinderError, IdentityError};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP callers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(msg) => ApiError::NotFound(msg),
            IdentityError::Conflict(msg) => ApiError::Conflict(msg),
            e @ (IdentityError::Api { .. } | IdentityError::Http(_)) => {
                ApiError::BadGateway(e.to_string())
            }
            e => ApiError::InternalServerError(e.to_string()),
        }
    }
}

impl From<BinderError> for ApiError {
    fn from(err: BinderError) -> Self {
        match err {
            BinderError::InvalidInput(msg) => ApiError::BadRequest(msg),
            BinderError::IdentityError(e) => e.into(),
            e @ BinderError::KubeError(_) => ApiError::BadGateway(e.to_string()),
            e => ApiError::InternalServerError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}
