//! Application context: the composition root.
//!
//! DESIGN
//! ======
//! Every shared store is created here once and handed to consumers through
//! this context instead of living in module-level singletons. Dropping the
//! context tears the stores down, which cancels their pending timers.
//!
//! Session operations that imply navigation (login, logout) go through the
//! context so their redirects are applied to the router it owns.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError};
use crate::cookies::{CookieError, CookieStore, FileCookieJar, MemoryCookieJar};
use crate::features::activities::{ActivitiesFeed, activities_feed};
use crate::features::interests::Interests;
use crate::features::notices::{Notices, notices};
use crate::features::profile::UserApi;
use crate::net::api::ApiClient;
use crate::net::transport::{ReqwestTransport, Transport};
use crate::net::types::LoginResponse;
use crate::routing::{DASHBOARD_ROUTE, Navigation, Router, RouterError};
use crate::state::background::BackgroundStore;
use crate::state::session::{AuthenticationError, SessionStore};
use crate::state::toast::ToastStore;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Cookie(#[from] CookieError),
}

pub struct AppContext {
    config: ClientConfig,
    session: SessionStore,
    api: ApiClient,
    router: Router,
    toast: ToastStore,
    background: BackgroundStore,
    activities: ActivitiesFeed,
    interests: Interests,
    notices: Notices,
    user: UserApi,
}

impl AppContext {
    /// Build a context from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the config is invalid or the cookie file
    /// cannot be opened.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Build a context using the reqwest transport and the configured cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Cookie`] if the cookie file exists but is unreadable.
    pub fn from_config(config: ClientConfig) -> Result<Self, AppError> {
        let cookies: Arc<dyn CookieStore> = match &config.cookie_path {
            Some(path) => Arc::new(FileCookieJar::open(path)?),
            None => Arc::new(MemoryCookieJar::new()),
        };
        Ok(Self::with_parts(config, Arc::new(ReqwestTransport::new()), cookies))
    }

    /// Build a context from explicit parts.
    #[must_use]
    pub fn with_parts(config: ClientConfig, transport: Arc<dyn Transport>, cookies: Arc<dyn CookieStore>) -> Self {
        let session = SessionStore::new(&config, Arc::clone(&transport), cookies);
        let api = ApiClient::new(&config, transport, session.clone());
        let router = Router::with_default_guards(session.clone());
        tracing::debug!(api_base_url = %config.api_base_url, "application context created");

        Self {
            activities: activities_feed(api.clone()),
            interests: Interests::new(api.clone()),
            notices: notices(api.clone()),
            user: UserApi::new(api.clone()),
            toast: ToastStore::new(),
            background: BackgroundStore::new(),
            config,
            session,
            api,
            router,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    #[must_use]
    pub fn toast(&self) -> &ToastStore {
        &self.toast
    }

    #[must_use]
    pub fn background(&self) -> &BackgroundStore {
        &self.background
    }

    #[must_use]
    pub fn activities(&self) -> &ActivitiesFeed {
        &self.activities
    }

    #[must_use]
    pub fn interests(&self) -> &Interests {
        &self.interests
    }

    #[must_use]
    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    #[must_use]
    pub fn user(&self) -> &UserApi {
        &self.user
    }

    /// Navigate through the guard chain.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] if the guards never settle.
    pub fn navigate(&mut self, to: &str) -> Result<Navigation, RouterError> {
        self.router.navigate(to)
    }

    /// Log in, report the outcome as a toast, and move to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthenticationError`] from the session store; the
    /// current route is unchanged in that case.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, AuthenticationError> {
        match self.session.login(email, password).await {
            Ok(response) => {
                self.toast.success(format!("Welcome back, {}", response.user_name));
                if let Err(e) = self.router.navigate(DASHBOARD_ROUTE) {
                    tracing::warn!(error = %e, "post-login navigation failed");
                }
                Ok(response)
            }
            Err(e) => {
                self.toast.error(e.message.clone());
                Err(e)
            }
        }
    }

    /// Log out and apply the resulting redirect to the router.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] if the redirect cannot be resolved.
    pub fn logout(&mut self) -> Result<Option<Navigation>, RouterError> {
        let redirect = self.session.logout();
        self.router.apply(redirect)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use serde_json::{Value, json};

    use super::*;
    use crate::cookies::AUTH_COOKIE;
    use crate::net::transport::test_helpers::MockTransport;

    pub const TEST_BASE: &str = "http://backend.test/api/v1";

    /// Session + API client over a mock transport and in-memory cookie jar.
    pub struct Fixture {
        pub transport: Arc<MockTransport>,
        pub cookies: Arc<MemoryCookieJar>,
        pub session: SessionStore,
        pub api: ApiClient,
    }

    #[must_use]
    pub fn test_config() -> ClientConfig {
        ClientConfig::new(TEST_BASE).expect("test base URL is valid")
    }

    #[must_use]
    pub fn fixture_with_jar(cookies: MemoryCookieJar) -> Fixture {
        let config = test_config();
        let transport = Arc::new(MockTransport::new(TEST_BASE));
        let cookies = Arc::new(cookies);
        let session = SessionStore::new(
            &config,
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&cookies) as Arc<dyn CookieStore>,
        );
        let api = ApiClient::new(&config, Arc::clone(&transport) as Arc<dyn Transport>, session.clone());
        Fixture { transport, cookies, session, api }
    }

    #[must_use]
    pub fn fixture() -> Fixture {
        fixture_with_jar(MemoryCookieJar::new())
    }

    /// Fixture whose session holds `token` restored from the cookie.
    #[must_use]
    pub fn signed_in(token: &str) -> Fixture {
        let fx = fixture_with_jar(MemoryCookieJar::with(AUTH_COOKIE, token));
        assert!(fx.session.restore_from_cookie());
        fx
    }

    #[must_use]
    pub fn login_body(token: &str) -> Value {
        json!({"token": token, "userId": 7, "userName": "Ada", "roleId": 2})
    }

    /// Application context over a mock transport and in-memory cookie jar.
    #[must_use]
    pub fn app_fixture(cookies: MemoryCookieJar) -> (Arc<MockTransport>, Arc<MemoryCookieJar>, AppContext) {
        let transport = Arc::new(MockTransport::new(TEST_BASE));
        let cookies = Arc::new(cookies);
        let app = AppContext::with_parts(
            test_config(),
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&cookies) as Arc<dyn CookieStore>,
        );
        (transport, cookies, app)
    }
}
