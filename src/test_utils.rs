// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses, time, and namespace behaviour.

use crate::deletion::{DeleteRequest, NamespaceApi};
use crate::poll::Clock;
use async_trait::async_trait;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::Service;

type Responses = HashMap<(String, String), VecDeque<(u16, String)>>;

/// A request observed by [`MockService`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Several responses registered for the same method and path are served in order;
/// the last one keeps being returned once the others are used up.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<Responses>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn next_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(method.to_string(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let content_type = req
                .headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = req.into_body().collect().await?.to_bytes();

            this.requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                content_type,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });

            let (status, body) = this
                .next_response(&method, &path)
                .unwrap_or_else(|| (404, not_found_json("resource", &path)));

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a mock namespace stuck in Terminating with the given finalizers
pub fn terminating_namespace_json(name: &str, metadata_finalizers: &[&str]) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid",
            "labels": { "team": "platform" },
            "deletionTimestamp": "2026-01-01T00:00:00Z",
            "finalizers": metadata_finalizers
        },
        "spec": { "finalizers": ["kubernetes"] },
        "status": { "phase": "Terminating" }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a failure status response with an arbitrary code
pub fn status_json(code: u16, reason: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": reason,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// A kube API error as the client would surface it
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: reason.to_string(),
        reason: reason.to_string(),
        code,
    })
}

/// A clock whose time only moves when slept on or advanced explicitly.
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }

    /// Virtual time passed since the clock was created
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceCall {
    Delete,
    Exists,
    ClearFinalizers,
}

#[derive(Default)]
struct FakeState {
    present_for: Option<u32>,
    present_after_force: Option<u32>,
    exists_error_at: Option<usize>,
    calls: Vec<NamespaceCall>,
}

/// Scripted in-memory namespace backend.
///
/// `present_for` is the number of existence checks that still see the namespace;
/// `None` keeps it present forever.
pub struct FakeNamespaces {
    absent_on_delete: bool,
    delete_latency: Option<(Arc<ManualClock>, Duration)>,
    delete_error: Option<u16>,
    patch_error: Option<u16>,
    state: Mutex<FakeState>,
}

impl FakeNamespaces {
    /// Namespace disappears after `checks` existence checks report it present
    pub fn present_for(checks: u32) -> Self {
        Self::with_presence(Some(checks))
    }

    /// Namespace never disappears on its own
    pub fn stuck() -> Self {
        Self::with_presence(None)
    }

    /// Namespace is already gone when deletion is requested
    pub fn absent() -> Self {
        let mut fake = Self::with_presence(Some(0));
        fake.absent_on_delete = true;
        fake
    }

    fn with_presence(present_for: Option<u32>) -> Self {
        Self {
            absent_on_delete: false,
            delete_latency: None,
            delete_error: None,
            patch_error: None,
            state: Mutex::new(FakeState {
                present_for,
                ..Default::default()
            }),
        }
    }

    /// After finalizers are cleared the namespace stays for `checks` more checks
    pub fn gone_after_force(self, checks: Option<u32>) -> Self {
        self.state.lock().unwrap().present_after_force = checks;
        self
    }

    /// The delete call takes `latency` of virtual time on `clock`
    pub fn delete_takes(mut self, clock: Arc<ManualClock>, latency: Duration) -> Self {
        self.delete_latency = Some((clock, latency));
        self
    }

    pub fn failing_delete(mut self, code: u16) -> Self {
        self.delete_error = Some(code);
        self
    }

    pub fn failing_patch(mut self, code: u16) -> Self {
        self.patch_error = Some(code);
        self
    }

    /// The n-th existence check (1-based) fails with a server error
    pub fn failing_exists_at(self, n: usize) -> Self {
        self.state.lock().unwrap().exists_error_at = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<NamespaceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: NamespaceCall) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }
}

#[async_trait]
impl NamespaceApi for FakeNamespaces {
    async fn delete(&self, _name: &str) -> crate::error::Result<DeleteRequest> {
        self.state.lock().unwrap().calls.push(NamespaceCall::Delete);
        if let Some((clock, latency)) = &self.delete_latency {
            clock.advance(*latency);
        }
        if let Some(code) = self.delete_error {
            return Err(api_error(code, "InternalError").into());
        }
        if self.absent_on_delete {
            Ok(DeleteRequest::Absent)
        } else {
            Ok(DeleteRequest::Accepted)
        }
    }

    async fn exists(&self, _name: &str) -> crate::error::Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NamespaceCall::Exists);
        let n = state
            .calls
            .iter()
            .filter(|c| **c == NamespaceCall::Exists)
            .count();
        if state.exists_error_at == Some(n) {
            return Err(api_error(500, "InternalError").into());
        }
        match state.present_for {
            Some(0) => Ok(false),
            Some(left) => {
                state.present_for = Some(left - 1);
                Ok(true)
            }
            None => Ok(true),
        }
    }

    async fn clear_finalizers(&self, _name: &str) -> crate::error::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NamespaceCall::ClearFinalizers);
        if let Some(code) = self.patch_error {
            return Err(api_error(code, "Forbidden").into());
        }
        state.present_for = state.present_after_force;
        Ok(())
    }
}

/// Serve an axum router on an ephemeral local port and return its base URL
pub async fn serve_router(router: axum::Router) -> url::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/", addr).parse().unwrap()
}
