//! HTTP transport seam.
//!
//! DESIGN
//! ======
//! `ApiClient` builds fully-resolved [`ApiRequest`] values and hands them to a
//! [`Transport`]. Production uses [`ReqwestTransport`]; tests swap in
//! `test_helpers::MockTransport` to record requests and replay responses
//! without a live backend.
//!
//! The transport reports only what crossed the wire (status + raw body).
//! Status interpretation and JSON decoding belong to `net::api`.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

/// A file attached as a multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<FilePart>),
}

/// Fully-resolved outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    /// Look up a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status code plus undecoded body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Async request executor. Enables mocking in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever status the backend answered with.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received (DNS, connect,
    /// TLS, body read failures, or an unbuildable request).
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

/// Production transport backed by a shared `reqwest::Client`.
///
/// No request timeout is configured; a hung backend keeps the caller pending.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self.http.request(request.method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Json(json)) => builder.json(&json),
            Some(RequestBody::Multipart(files)) => builder.multipart(multipart_form(files)?),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

fn multipart_form(files: Vec<FilePart>) -> Result<reqwest::multipart::Form, TransportError> {
    let mut form = reqwest::multipart::Form::new();
    for file in files {
        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.mime.as_deref() {
            part = part.mime_str(mime).map_err(|e| TransportError(e.to_string()))?;
        }
        form = form.part(file.field, part);
    }
    Ok(form)
}

// =============================================================================
// TEST HELPERS
// =============================================================================
