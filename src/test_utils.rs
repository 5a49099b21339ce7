// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API service and in-memory fakes for the
//! credential sync capabilities.

use crate::error::{Result as SamplesResult, SamplesError};
use crate::kubernetes::{SecretStore, StatusWriter};
use crate::sync::UpsertGate;
use crate::types::samples_config::SamplesConfig;
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::error::ErrorResponse;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request seen by the mock service
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses based on request paths.
/// Clones share their responses and the log of received requests.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
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
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("resource", &path)));
        let requests = Arc::clone(&self.requests);

        Box::pin(async move {
            let sent = req.into_body().collect_bytes().await?;
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                body: String::from_utf8_lossy(&sent).into_owned(),
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock secret JSON response
pub fn secret_json(namespace: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        },
        "type": "kubernetes.io/dockerconfigjson",
        "data": {
            ".dockerconfigjson": "e30="
        }
    })
    .to_string()
}

/// Create a mock samples Config JSON response
pub fn samples_config_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "samples.operator.openshift.io/v1",
        "kind": "Config",
        "metadata": {
            "name": name,
            "uid": "test-uid",
            "resourceVersion": "7"
        },
        "spec": {
            "managementState": "Managed"
        }
    })
    .to_string()
}

fn status_json(reason: &str, message: String, code: u16) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json("NotFound", format!("{} \"{}\" not found", resource, name), 404)
}

/// Create a 409 conflict response for a stale resourceVersion
pub fn conflict_json(resource: &str, name: &str) -> String {
    status_json(
        "Conflict",
        format!(
            "Operation cannot be fulfilled on {} \"{}\": the object has been modified",
            resource, name
        ),
        409,
    )
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    status_json(
        "AlreadyExists",
        format!("{} \"{}\" already exists", resource, name),
        409,
    )
}

/// A pull secret with dockerconfig payload in the given slot
pub fn make_pull_secret(
    namespace: &str,
    name: &str,
    annotations: Option<BTreeMap<String, String>>,
) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations,
            resource_version: Some("42".to_string()),
            uid: Some("source-uid".to_string()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            ".dockerconfigjson".to_string(),
            ByteString(br#"{"auths":{}}"#.to_vec()),
        )])),
        type_: Some("kubernetes.io/dockerconfigjson".to_string()),
        ..Default::default()
    }
}

fn internal_error() -> SamplesError {
    SamplesError::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: "injected failure".to_string(),
        reason: "InternalError".to_string(),
        code: 500,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String, String),
    Create(String, String),
    Update(String, String),
    Delete(String, String),
}

/// In-memory secret store that records every call
#[derive(Default)]
pub struct FakeSecretStore {
    secrets: Mutex<BTreeMap<(String, String), Secret>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_writes: AtomicBool,
    missing_as_none: AtomicBool,
}

impl FakeSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, secret: Secret) -> Self {
        self.insert(secret);
        self
    }

    pub fn insert(&self, secret: Secret) {
        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.secrets.lock().unwrap().insert(key, secret);
    }

    /// Make create and update fail with a server error
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Make get return `Ok(None)` instead of `NotFound` for absent secrets
    pub fn report_missing_as_none(&self) {
        self.missing_as_none.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn key_for(namespace: &str, secret: &Secret) -> (String, String) {
    (
        namespace.to_string(),
        secret.metadata.name.clone().unwrap_or_default(),
    )
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> SamplesResult<Option<Secret>> {
        self.record(StoreCall::Get(namespace.to_string(), name.to_string()));
        match self.stored(namespace, name) {
            Some(secret) => Ok(Some(secret)),
            None if self.missing_as_none.load(Ordering::SeqCst) => Ok(None),
            None => Err(SamplesError::not_found(namespace, name)),
        }
    }

    async fn create(&self, namespace: &str, secret: &Secret) -> SamplesResult<Secret> {
        let key = key_for(namespace, secret);
        self.record(StoreCall::Create(key.0.clone(), key.1.clone()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(internal_error());
        }
        let mut secrets = self.secrets.lock().unwrap();
        if secrets.contains_key(&key) {
            return Err(SamplesError::already_exists(&key.0, &key.1));
        }
        let mut stored = secret.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        secrets.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, namespace: &str, secret: &Secret) -> SamplesResult<Secret> {
        let key = key_for(namespace, secret);
        self.record(StoreCall::Update(key.0.clone(), key.1.clone()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(internal_error());
        }
        let mut secrets = self.secrets.lock().unwrap();
        if !secrets.contains_key(&key) {
            return Err(SamplesError::not_found(&key.0, &key.1));
        }
        let mut stored = secret.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        secrets.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, namespace: &str, name: &str) -> SamplesResult<()> {
        self.record(StoreCall::Delete(namespace.to_string(), name.to_string()));
        self.secrets
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| SamplesError::not_found(namespace, name))
    }
}

/// Status writer that counts flushes and keeps the last written object
#[derive(Default)]
pub struct RecordingStatusWriter {
    updates: AtomicUsize,
    last: Mutex<Option<SamplesConfig>>,
    fail: AtomicBool,
}

impl RecordingStatusWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_updates(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn last_written(&self) -> Option<SamplesConfig> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusWriter for RecordingStatusWriter {
    async fn update_status(&self, config: &SamplesConfig) -> SamplesResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(internal_error());
        }
        *self.last.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}

/// Upsert gate with a settable in-flight count
#[derive(Default)]
pub struct FixedUpsertGate(AtomicUsize);

impl FixedUpsertGate {
    pub fn new(in_flight: usize) -> Self {
        Self(AtomicUsize::new(in_flight))
    }

    pub fn set(&self, in_flight: usize) {
        self.0.store(in_flight, Ordering::SeqCst);
    }
}

impl UpsertGate for FixedUpsertGate {
    fn in_flight_count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
