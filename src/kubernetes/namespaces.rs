// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::constants::SERVICE_NAME;
use crate::deletion::{DeleteRequest, NamespaceApi};
use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{DeleteParams, Patch, PatchParams, PostParams},
    Api, Client,
};
use serde_json::json;
use tracing::{debug, info, instrument};

/// Cluster-scoped namespace access through the Kubernetes API
#[derive(Clone)]
pub struct KubeNamespaces {
    namespaces: Api<Namespace>,
}

impl KubeNamespaces {
    pub fn new(client: Client) -> Self {
        Self {
            namespaces: Api::all(client),
        }
    }
}

fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(e) if e.code == 404)
}

fn has_entries(finalizers: Option<&Vec<String>>) -> bool {
    finalizers.is_some_and(|f| !f.is_empty())
}

#[async_trait]
impl NamespaceApi for KubeNamespaces {
    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> Result<DeleteRequest> {
        match self.namespaces.delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                debug!("Delete of namespace {} accepted", name);
                Ok(DeleteRequest::Accepted)
            }
            Err(e) if is_not_found(&e) => Ok(DeleteRequest::Absent),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn exists(&self, name: &str) -> Result<bool> {
        match self.namespaces.get(name).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Clears `metadata.finalizers` with a merge patch and `spec.finalizers` through the
    /// `finalize` subresource, which is the only way to update the latter.
    #[instrument(skip(self))]
    async fn clear_finalizers(&self, name: &str) -> Result<()> {
        let mut namespace = match self.namespaces.get(name).await {
            Ok(ns) => ns,
            Err(e) if is_not_found(&e) => {
                debug!("Namespace {} disappeared before finalizers were cleared", name);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if has_entries(namespace.metadata.finalizers.as_ref()) {
            info!(
                "Removing metadata finalizers {:?} from namespace {}",
                namespace.metadata.finalizers.as_deref().unwrap_or_default(),
                name
            );
            let patch = json!({ "metadata": { "finalizers": [] } });
            let pp = PatchParams {
                field_manager: Some(SERVICE_NAME.to_string()),
                ..Default::default()
            };
            namespace = match self
                .namespaces
                .patch(name, &pp, &Patch::Merge(&patch))
                .await
            {
                Ok(ns) => ns,
                Err(e) if is_not_found(&e) => return Ok(()),
                Err(e) => return Err(e.into()),
            };
        }

        let spec_finalizers = namespace.spec.as_ref().and_then(|s| s.finalizers.as_ref());
        if has_entries(spec_finalizers) {
            info!(
                "Removing spec finalizers {:?} from namespace {}",
                spec_finalizers.map(Vec::as_slice).unwrap_or_default(),
                name
            );
            if let Some(spec) = namespace.spec.as_mut() {
                spec.finalizers = Some(Vec::new());
            }
            let data = serde_json::to_vec(&namespace)?;
            match self
                .namespaces
                .replace_subresource("finalize", name, &PostParams::default(), data)
                .await
            {
                Ok(_) => {}
                Err(e) if is_not_found(&e) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
