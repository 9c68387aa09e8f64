//! Auth-session state for the current client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store is the single mutable shared resource of the client.
//! The route guard reads and restores it, the API client reads the credential
//! from it on every request, and feature resources subscribe to it so a login
//! or logout re-runs their fetches.
//!
//! DESIGN
//! ======
//! [`Session`] is an enum so an identity can never exist without a credential.
//! State lives in a `tokio::sync::watch` channel: every mutation notifies
//! subscribers synchronously and readers always see a complete snapshot.
//! The credential is mirrored into the `auth_token` cookie so a later process
//! (or page load) can restore it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::cookies::{AUTH_COOKIE, CookieStore};
use crate::net::api::backend_error_message;
use crate::net::transport::{ApiRequest, RequestBody, Transport};
use crate::net::types::{LoginRequest, LoginResponse};
use crate::routing::{LOGIN_ROUTE, NavigationDecision};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const ADMIN_ROLE_ID: i64 = 1;

// =============================================================================
// TOKEN / IDENTITY / SESSION
// =============================================================================

/// Opaque bearer credential. Never decoded; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token. Blank input yields `None`.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() { None } else { Some(Self(raw)) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Authenticated user as reported by the login response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    pub role_id: i64,
}

impl Identity {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role_id == ADMIN_ROLE_ID
    }
}

/// Current session.
///
/// `Restored` is a credential recovered from the cookie without a fresh
/// login, so no identity is known yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Restored {
        credential: Token,
    },
    Authenticated {
        credential: Token,
        identity: Identity,
    },
}

impl Session {
    #[must_use]
    pub fn credential(&self) -> Option<&Token> {
        match self {
            Self::Anonymous => None,
            Self::Restored { credential } | Self::Authenticated { credential, .. } => Some(credential),
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

/// Login was rejected or could not complete. Carries a user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthenticationError {
    pub message: String,
}

impl AuthenticationError {
    fn invalid_credentials() -> Self {
        Self { message: INVALID_CREDENTIALS_MESSAGE.to_owned() }
    }
}

// =============================================================================
// STORE
// =============================================================================

struct SessionInner {
    state: watch::Sender<Session>,
    cookies: Arc<dyn CookieStore>,
    transport: Arc<dyn Transport>,
    login_url: String,
}

/// Shared handle to the session. Clones observe and mutate the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Create an empty (`Anonymous`) session. The cookie is not read here; the
    /// route guard restores it on the first navigation.
    #[must_use]
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>, cookies: Arc<dyn CookieStore>) -> Self {
        let (state, _) = watch::channel(Session::Anonymous);
        Self {
            inner: Arc::new(SessionInner { state, cookies, transport, login_url: config.endpoint("/auth/login") }),
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn credential(&self) -> Option<Token> {
        self.inner.state.borrow().credential().cloned()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().credential().is_some()
    }

    /// Register for change notifications. The receiver starts at the current
    /// value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Credential currently held in the persisted cookie.
    #[must_use]
    pub fn persisted_credential(&self) -> Option<Token> {
        self.inner.cookies.get(AUTH_COOKIE).and_then(Token::new)
    }

    /// If memory holds no credential but the cookie does, adopt the cookie's.
    /// Returns `true` when the session changed.
    pub fn restore_from_cookie(&self) -> bool {
        let restored = self.inner.state.send_if_modified(|session| {
            if session.credential().is_some() {
                return false;
            }
            match self.persisted_credential() {
                Some(credential) => {
                    *session = Session::Restored { credential };
                    true
                }
                None => false,
            }
        });
        if restored {
            tracing::info!("session restored from cookie");
        }
        restored
    }

    /// Authenticate against `POST /auth/login`.
    ///
    /// On success the session becomes `Authenticated`, the cookie is written,
    /// and the backend response is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError`] with the backend's `error` message when
    /// present, otherwise a generic invalid-credentials message. The session is
    /// left untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthenticationError> {
        let body = serde_json::to_value(LoginRequest { email, password })
            .map_err(|_| AuthenticationError::invalid_credentials())?;
        let request = ApiRequest {
            method: Method::POST,
            url: self.inner.login_url.clone(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Some(RequestBody::Json(body)),
        };

        let response = self.inner.transport.send(request).await.map_err(|e| {
            tracing::warn!(error = %e, "login request failed");
            AuthenticationError::invalid_credentials()
        })?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "login rejected");
            let payload = serde_json::from_str(&response.body).unwrap_or(serde_json::Value::Null);
            let message = backend_error_message(&payload).unwrap_or(INVALID_CREDENTIALS_MESSAGE);
            return Err(AuthenticationError { message: message.to_owned() });
        }

        let login: LoginResponse = serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!(error = %e, "login response malformed");
            AuthenticationError::invalid_credentials()
        })?;
        let Some(credential) = Token::new(login.token.clone()) else {
            tracing::warn!("login response carried an empty token");
            return Err(AuthenticationError::invalid_credentials());
        };

        let identity = Identity {
            id: login.user_id,
            display_name: login.user_name.clone(),
            email: email.to_owned(),
            role_id: login.role_id,
        };
        let user_id = identity.id;
        self.inner.state.send_replace(Session::Authenticated { credential: credential.clone(), identity });
        if let Err(e) = self.inner.cookies.set(AUTH_COOKIE, credential.as_str()) {
            tracing::warn!(error = %e, "failed to persist auth cookie");
        }

        tracing::info!(user_id, "login succeeded");
        Ok(login)
    }

    /// Drop the session locally and clear the cookie. The backend is not
    /// contacted. Returns the redirect the caller must apply.
    pub fn logout(&self) -> NavigationDecision {
        let changed = self.inner.state.send_if_modified(|session| {
            if *session == Session::Anonymous {
                return false;
            }
            *session = Session::Anonymous;
            true
        });
        if let Err(e) = self.inner.cookies.remove(AUTH_COOKIE) {
            tracing::warn!(error = %e, "failed to clear auth cookie");
        }
        if changed {
            tracing::info!("logged out");
        }
        NavigationDecision::RedirectTo(LOGIN_ROUTE.to_owned())
    }
}
