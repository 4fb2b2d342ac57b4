use async_trait::async_trait;
use axum::{
    body::Bytes,
    http::{HeaderMap, HeaderName, Method, StatusCode, header},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::BackendError;

/// Largest request body relayed to the backend API.
pub const MAX_FORWARD_BODY_BYTES: usize = 10 * 1024 * 1024;

/// ForwardRequest
///
/// An `/api` request stripped down to what the backend needs. `path_and_query`
/// is relayed verbatim: the edge never rewrites API paths.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// The backend's answer, relayed to the client as-is (minus hop-by-hop headers).
#[derive(Debug, Clone)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

// 1. BackendService Contract
/// BackendService
///
/// Abstract contract for reaching the backend API. Handlers only see this
/// trait, so tests swap the HTTP client for `MockBackend`.
#[async_trait]
pub trait BackendService: Send + Sync {
    /// Whether `/api` requests have a destination at all.
    fn is_configured(&self) -> bool;

    /// Sends the request to the backend and returns its response.
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, BackendError>;
}

/// Shared handle to whichever backend the server was started with.
pub type BackendState = Arc<dyn BackendService>;

/// Removes headers that describe a single connection rather than the message.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let hop_by_hop: [HeaderName; 6] = [
        header::CONNECTION,
        header::HOST,
        header::CONTENT_LENGTH,
        header::TRANSFER_ENCODING,
        header::TE,
        header::UPGRADE,
    ];
    for name in hop_by_hop {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
}

// 2. The Real Implementation (reqwest)
/// HttpBackend
///
/// Forwards over HTTP with a single pooled `reqwest::Client`.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// new
    ///
    /// `base_url` must not end with a slash; `AppConfig` already normalizes it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl BackendService for HttpBackend {
    fn is_configured(&self) -> bool {
        true
    }

    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, BackendError> {
        let url = format!("{}{}", self.base_url, request.path_and_query);
        let mut headers = request.headers;
        strip_hop_by_hop(&mut headers);

        tracing::debug!(method = %request.method, %url, "Forwarding to backend API");

        let response = self
            .client
            .request(request.method, url.as_str())
            .headers(headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_by_hop(&mut headers);
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(ForwardResponse {
            status,
            headers,
            body,
        })
    }
}

/// UnconfiguredBackend
///
/// Used when no `BACKEND_URL` is set (local mode only). Every `/api` request
/// fails with `BackendError::NotConfigured`.
#[derive(Clone, Default)]
pub struct UnconfiguredBackend;

#[async_trait]
impl BackendService for UnconfiguredBackend {
    fn is_configured(&self) -> bool {
        false
    }

    async fn forward(&self, _request: ForwardRequest) -> Result<ForwardResponse, BackendError> {
        Err(BackendError::NotConfigured)
    }
}

// 3. The Mock Implementation (For Testing)
/// MockBackend
///
/// Records every forwarded request and answers with a canned JSON response.
pub struct MockBackend {
    status: StatusCode,
    body: String,
    received: Mutex<Vec<ForwardRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_response(StatusCode::OK, r#"{"success":true}"#)
    }

    pub fn with_response(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far, oldest first.
    pub fn received(&self) -> Vec<ForwardRequest> {
        self.received
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendService for MockBackend {
    fn is_configured(&self) -> bool {
        true
    }

    async fn forward(&self, request: ForwardRequest) -> Result<ForwardResponse, BackendError> {
        if let Ok(mut received) = self.received.lock() {
            received.push(request);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(ForwardResponse {
            status: self.status,
            headers,
            body: Bytes::from(self.body.clone()),
        })
    }
}
