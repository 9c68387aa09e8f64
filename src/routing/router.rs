//! Router abstraction driving the guard chain.
//!
//! DESIGN
//! ======
//! Guards run in registration order; the first redirect wins and the chain is
//! re-run against the redirect target, exactly as a fresh navigation would be.
//! A chain that keeps redirecting is cut off after [`MAX_REDIRECTS`] hops.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::sync::Arc;

use super::guard::{AdminGuard, AuthGuard, Middleware, NavigationDecision};
use crate::state::session::SessionStore;

pub const MAX_REDIRECTS: usize = 8;

/// Result of a committed navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub landed: String,
    /// Redirect targets in the order they were followed.
    pub redirects: Vec<String>,
}

impl Navigation {
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("redirect loop navigating to {path} after {hops} hops")]
    RedirectLoop { path: String, hops: usize },
}

pub struct Router {
    session: SessionStore,
    chain: Vec<Arc<dyn Middleware>>,
    current: Option<String>,
}

impl Router {
    /// Router with an empty guard chain.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        Self { session, chain: Vec::new(), current: None }
    }

    /// Router with the global auth guard followed by the admin guard.
    #[must_use]
    pub fn with_default_guards(session: SessionStore) -> Self {
        let mut router = Self::new(session);
        router.register(AuthGuard);
        router.register(AdminGuard);
        router
    }

    /// Append a guard to the chain.
    pub fn register(&mut self, middleware: impl Middleware + 'static) {
        self.chain.push(Arc::new(middleware));
    }

    /// Route the last navigation landed on.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Run the guard chain for `to` without committing the result.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RedirectLoop`] if the chain redirects more than
    /// [`MAX_REDIRECTS`] times.
    pub fn resolve(&self, to: &str) -> Result<Navigation, RouterError> {
        let mut target = to.to_owned();
        let mut redirects = Vec::new();

        'chain: loop {
            for middleware in &self.chain {
                if let NavigationDecision::RedirectTo(next) = middleware.before_navigate(&target, &self.session) {
                    if redirects.len() == MAX_REDIRECTS {
                        tracing::warn!(path = %to, hops = MAX_REDIRECTS, "navigation redirect loop");
                        return Err(RouterError::RedirectLoop { path: to.to_owned(), hops: MAX_REDIRECTS });
                    }
                    tracing::debug!(guard = middleware.name(), from = %target, to = %next, "navigation redirected");
                    redirects.push(next.clone());
                    target = next;
                    continue 'chain;
                }
            }
            break;
        }

        Ok(Navigation { requested: to.to_owned(), landed: target, redirects })
    }

    /// Navigate to `to`, following guard redirects, and record where it landed.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RedirectLoop`] if the guards never settle. The
    /// current route is left unchanged in that case.
    pub fn navigate(&mut self, to: &str) -> Result<Navigation, RouterError> {
        let navigation = self.resolve(to)?;
        if navigation.was_redirected() {
            tracing::info!(requested = %navigation.requested, landed = %navigation.landed, "navigation redirected");
        }
        self.current = Some(navigation.landed.clone());
        Ok(navigation)
    }

    /// Apply a decision produced outside the chain (e.g. by logout).
    ///
    /// # Errors
    ///
    /// Propagates [`RouterError`] from the resulting navigation.
    pub fn apply(&mut self, decision: NavigationDecision) -> Result<Option<Navigation>, RouterError> {
        match decision {
            NavigationDecision::Allow => Ok(None),
            NavigationDecision::RedirectTo(path) => self.navigate(&path).map(Some),
        }
    }
}
