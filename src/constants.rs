// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Namespace deletion timing defaults
pub mod deletion {
    /// Interval between existence checks in seconds
    pub const POLL_INTERVAL_SECS: u64 = 1;
    /// Time allowed for a normal deletion, measured from the delete call
    pub const DELETE_TIMEOUT_SECS: u64 = 100;
    /// Time allowed for the namespace to disappear after its finalizers are cleared
    pub const FORCE_TIMEOUT_SECS: u64 = 30;
    /// Reason reported when the namespace could not be forced out
    pub const FORCE_DELETE_FAILED: &str = "ForceDeleteFailed";
}

/// Azure managed identity settings
pub mod identity {
    pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com/";
    pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com/";
    pub const ARM_SCOPE: &str = "https://management.azure.com/.default";
    pub const MSI_API_VERSION: &str = "2023-01-31";
    /// Audience Azure AD expects on exchanged Kubernetes tokens
    pub const TOKEN_EXCHANGE_AUDIENCE: &str = "api://AzureADTokenExchange";
    /// Refresh cached access tokens this many seconds before they expire
    pub const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;
}

/// The service name used as field manager and user agent
pub const SERVICE_NAME: &str = "workload-binder";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
