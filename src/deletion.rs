// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace deletion with verification and forced finalizer removal.
//!
//! A namespace only counts as deleted once a lookup no longer finds it. If it is still
//! present when the first window closes, its finalizers are cleared and a second, shorter
//! window is given for it to disappear.

use crate::constants::deletion::FORCE_DELETE_FAILED;
use crate::error::{BinderError, Result};
use crate::poll::{poll_until, Clock, PollOutcome, RetryPolicy};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Result of asking the API server to delete a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRequest {
    /// The API server accepted the request; removal may still be pending
    Accepted,
    /// The namespace did not exist
    Absent,
}

/// Namespace operations the orchestrator needs from the cluster.
///
/// Implementations map "not found" to [`DeleteRequest::Absent`] or `false` and report
/// every other failure as an error.
#[async_trait]
pub trait NamespaceApi: Send + Sync {
    async fn delete(&self, name: &str) -> Result<DeleteRequest>;
    async fn exists(&self, name: &str) -> Result<bool>;
    /// Remove every finalizer from the namespace, leaving other fields as they are
    async fn clear_finalizers(&self, name: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionPhase {
    Requested,
    Polling,
    TimedOut,
    ForcePatching,
    Verified,
    Failed,
}

impl fmt::Display for DeletionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessStatus {
    /// The namespace was already gone when deletion was requested
    Immediate,
    DeletedNormally,
    DeletedAfterForce,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureStatus {
    /// Clearing the finalizers failed
    PatchFailed { cause: String },
    /// Finalizers were cleared but the namespace did not go away
    StillPresentAfterForce,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(SuccessStatus),
    Failure(FailureStatus),
}

/// Final result of one deletion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub namespace: String,
    pub outcome: Outcome,
    pub phase: DeletionPhase,
    pub elapsed: Duration,
    /// Number of existence checks performed
    pub polls: u32,
}

/// Wire representation of a [`DeletionReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionStatus {
    pub namespace: String,
    pub success: bool,
    pub phase: DeletionPhase,
    pub forced: bool,
    pub immediate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub elapsed_secs: f64,
    pub polls: u32,
}

impl DeletionReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Whether finalizers were cleared during this attempt
    pub fn is_forced(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Success(SuccessStatus::DeletedAfterForce)
                | Outcome::Failure(FailureStatus::StillPresentAfterForce)
        )
    }

    pub fn status(&self) -> DeletionStatus {
        let (reason, detail) = match &self.outcome {
            Outcome::Success(_) => (None, None),
            Outcome::Failure(FailureStatus::PatchFailed { cause }) => (
                Some(FORCE_DELETE_FAILED.to_string()),
                Some(format!(
                    "failed to clear finalizers of namespace {} after {:.0}s: {}",
                    self.namespace,
                    self.elapsed.as_secs_f64(),
                    cause
                )),
            ),
            Outcome::Failure(FailureStatus::StillPresentAfterForce) => (
                Some(FORCE_DELETE_FAILED.to_string()),
                Some(format!(
                    "namespace {} still exists after {:.0}s",
                    self.namespace,
                    self.elapsed.as_secs_f64()
                )),
            ),
        };

        DeletionStatus {
            namespace: self.namespace.clone(),
            success: self.is_success(),
            phase: self.phase,
            forced: self.is_forced(),
            immediate: self.outcome == Outcome::Success(SuccessStatus::Immediate),
            reason,
            detail,
            elapsed_secs: self.elapsed.as_secs_f64(),
            polls: self.polls,
        }
    }
}

/// In-flight state of a single deletion
struct DeletionAttempt<'a> {
    namespace: &'a str,
    started_at: Instant,
    phase: DeletionPhase,
    polls: u32,
}

impl<'a> DeletionAttempt<'a> {
    fn new(namespace: &'a str, started_at: Instant) -> Self {
        Self {
            namespace,
            started_at,
            phase: DeletionPhase::Requested,
            polls: 0,
        }
    }

    fn enter(&mut self, phase: DeletionPhase) {
        debug!(
            "Namespace {} deletion: {} -> {}",
            self.namespace, self.phase, phase
        );
        self.phase = phase;
    }

    fn finish(mut self, clock: &dyn Clock, outcome: Outcome) -> DeletionReport {
        let phase = match outcome {
            Outcome::Success(_) => DeletionPhase::Verified,
            Outcome::Failure(_) => DeletionPhase::Failed,
        };
        self.enter(phase);

        DeletionReport {
            namespace: self.namespace.to_string(),
            outcome,
            phase: self.phase,
            elapsed: clock.now().saturating_duration_since(self.started_at),
            polls: self.polls,
        }
    }
}

/// Deletes namespaces and waits until they are really gone.
#[derive(Clone)]
pub struct NamespaceDeleter {
    namespaces: Arc<dyn NamespaceApi>,
    clock: Arc<dyn Clock>,
    delete_policy: RetryPolicy,
    force_policy: RetryPolicy,
}

impl NamespaceDeleter {
    pub fn new(
        namespaces: Arc<dyn NamespaceApi>,
        clock: Arc<dyn Clock>,
        delete_policy: RetryPolicy,
        force_policy: RetryPolicy,
    ) -> Self {
        Self {
            namespaces,
            clock,
            delete_policy,
            force_policy,
        }
    }

    /// Delete a namespace and verify it is gone, clearing its finalizers if it lingers.
    ///
    /// Errors from the delete call or an existence check are returned as-is. A failed
    /// finalizer patch is reported as a failed [`DeletionReport`].
    #[instrument(skip(self))]
    pub async fn delete_namespace(&self, name: &str) -> Result<DeletionReport> {
        if name.trim().is_empty() {
            return Err(BinderError::InvalidInput(
                "namespace name must not be empty".to_string(),
            ));
        }

        let clock = self.clock.as_ref();
        let mut attempt = DeletionAttempt::new(name, clock.now());

        info!("Deleting namespace {}", name);
        if self.namespaces.delete(name).await? == DeleteRequest::Absent {
            info!("Namespace {} was already absent", name);
            return Ok(attempt.finish(clock, Outcome::Success(SuccessStatus::Immediate)));
        }

        attempt.enter(DeletionPhase::Polling);
        let started_at = attempt.started_at;
        let outcome = self
            .wait_until_gone(&mut attempt, &self.delete_policy, started_at)
            .await?;
        if let PollOutcome::Satisfied { .. } = outcome {
            info!("Namespace {} deleted", name);
            return Ok(attempt.finish(clock, Outcome::Success(SuccessStatus::DeletedNormally)));
        }

        attempt.enter(DeletionPhase::TimedOut);
        warn!(
            "Namespace {} still present after {}s, clearing finalizers",
            name,
            self.delete_policy.max_duration.as_secs()
        );

        if let Err(e) = self.namespaces.clear_finalizers(name).await {
            warn!("Failed to clear finalizers of namespace {}: {}", name, e);
            return Ok(attempt.finish(
                clock,
                Outcome::Failure(FailureStatus::PatchFailed {
                    cause: e.to_string(),
                }),
            ));
        }

        attempt.enter(DeletionPhase::ForcePatching);
        let patched_at = clock.now();
        let outcome = self
            .wait_until_gone(&mut attempt, &self.force_policy, patched_at)
            .await?;
        match outcome {
            PollOutcome::Satisfied { .. } => {
                info!("Namespace {} deleted after clearing finalizers", name);
                Ok(attempt.finish(clock, Outcome::Success(SuccessStatus::DeletedAfterForce)))
            }
            PollOutcome::TimedOut { .. } => {
                let report = attempt.finish(
                    clock,
                    Outcome::Failure(FailureStatus::StillPresentAfterForce),
                );
                warn!(
                    "Namespace {} still present {:.0}s after deletion was requested",
                    name,
                    report.elapsed.as_secs_f64()
                );
                Ok(report)
            }
        }
    }

    async fn wait_until_gone(
        &self,
        attempt: &mut DeletionAttempt<'_>,
        policy: &RetryPolicy,
        started_at: Instant,
    ) -> Result<PollOutcome> {
        let name = attempt.namespace;
        let namespaces = &self.namespaces;
        let outcome = poll_until(self.clock.as_ref(), policy, started_at, move || async move {
            namespaces.exists(name).await.map(|present| !present)
        })
        .await;

        match outcome {
            Ok(o) => {
                attempt.polls += o.attempts();
                debug!("Namespace {} poll finished: {:?}", name, o);
                Ok(o)
            }
            Err(e) => {
                attempt.enter(DeletionPhase::Failed);
                Err(e)
            }
        }
    }
}
