//! Authenticated REST wrapper around the activity backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every feature resource talks to the backend through [`ApiClient::request`].
//! The client prefixes the configured base URL and attaches
//! `Authorization: Bearer <token>` from the session store at send time.
//!
//! ERROR HANDLING
//! ==============
//! Requests without a credential are still sent with an empty `Authorization`
//! header; the backend's 401 drives the failure path. Non-2xx responses come
//! back as [`ApiError::Http`] carrying the decoded backend payload. Nothing is
//! retried, cached, or deduplicated.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{ApiRequest, FilePart, RequestBody, Transport};
use crate::config::ClientConfig;
use crate::state::session::{SessionStore, Token};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {payload}")]
    Http { status: u16, payload: Value },

    /// The request never reached the backend or the response was cut off.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A mutation was attempted without a credential; nothing was sent.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl ApiError {
    /// HTTP status, if the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-supplied `error` message, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Http { payload, .. } => backend_error_message(payload),
            _ => None,
        }
    }
}

/// Extract the `error` string from a backend error payload.
#[must_use]
pub fn backend_error_message(payload: &Value) -> Option<&str> {
    payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|msg| !msg.trim().is_empty())
}

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Caller-supplied request shape. The path and auth header are added by
/// [`ApiClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::GET, query: Vec::new(), headers: Vec::new(), body: None }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn method(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    #[must_use]
    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Attach a JSON body. Serialization failures are logged and send `null`;
    /// the crate's request DTOs are plain structs of strings and integers.
    #[must_use]
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        let value = serde_json::to_value(body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "request body serialization failed, sending null");
            Value::Null
        });
        self.body = Some(RequestBody::Json(value));
        self
    }

    #[must_use]
    pub fn file(mut self, file: FilePart) -> Self {
        match &mut self.body {
            Some(RequestBody::Multipart(files)) => files.push(file),
            _ => self.body = Some(RequestBody::Multipart(vec![file])),
        }
        self
    }
}

/// `Authorization` header value for an optional credential.
#[must_use]
pub fn authorization_header(credential: Option<&Token>) -> String {
    credential.map(Token::bearer).unwrap_or_default()
}

// =============================================================================
// CLIENT
// =============================================================================

/// Cloneable handle; clones share the transport and session store.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: SessionStore,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self { base_url: config.api_base_url.clone(), transport, session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `path` and `options` into the request that would be sent now.
    #[must_use]
    pub fn build_request(&self, path: &str, options: RequestOptions) -> ApiRequest {
        let mut headers: Vec<(String, String)> = options
            .headers
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
            .collect();
        let credential = self.session.credential();
        headers.push(("Authorization".to_owned(), authorization_header(credential.as_ref())));

        ApiRequest {
            method: options.method,
            url: format!("{}{path}", self.base_url),
            query: options.query,
            headers,
            body: options.body,
        }
    }

    /// Send a request and return the decoded JSON body.
    ///
    /// Empty 2xx bodies decode as `null`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Http`] for non-2xx statuses, [`ApiError::Network`] when no
    /// response arrived, [`ApiError::Decode`] for a non-JSON 2xx body.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let request = self.build_request(path, options);
        let method = request.method.clone();
        tracing::debug!(%method, path, "api request");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "api request failed before response");
            ApiError::Network(e.0)
        })?;

        if !response.is_success() {
            tracing::warn!(%method, path, status = response.status, "api request rejected");
            return Err(ApiError::Http { status: response.status, payload: error_payload(&response.body) });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::request`], plus [`ApiError::Decode`] when the body
    /// does not match `T`.
    pub async fn request_json<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        let value = self.request(path, options).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn error_payload(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_owned()))
}
