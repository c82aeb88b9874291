// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Federated identity credentials on Azure user-assigned managed identities.

pub mod binding;
pub mod client;
pub mod credential;

pub use binding::{CredentialRef, FederatedCredential};
pub use client::ArmIdentityClient;
pub use credential::{TokenProvider, WorkloadIdentityCredential};

use crate::error::IdentityError;
use async_trait::async_trait;

/// Create and delete federated identity credentials.
///
/// Calls are passed straight through to the identity service; errors such as a
/// missing credential or a conflicting create are returned for the caller to interpret.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn create_binding(
        &self,
        target: &CredentialRef,
        credential: &FederatedCredential,
    ) -> Result<(), IdentityError>;

    async fn delete_binding(&self, target: &CredentialRef) -> Result<(), IdentityError>;
}
