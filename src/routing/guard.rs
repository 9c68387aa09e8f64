//! Navigation guards.
//!
//! DESIGN
//! ======
//! A guard is a [`Middleware`] consulted before every navigation. It returns a
//! tagged [`NavigationDecision`] instead of performing the redirect itself, so
//! the router owns the navigation state. Guards are synchronous and never do
//! network I/O; the only side effect allowed is restoring the session from
//! the persisted cookie.
//!
//! Classification is a static set check on the path component. Query strings
//! and fragments are ignored, trailing slashes are not normalised.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::{ADMIN_ROUTE_PREFIX, DASHBOARD_ROUTE, LANDING_ROUTE, LOGIN_ROUTE, REGISTER_ROUTE};
use crate::state::session::SessionStore;

/// Routes reachable without a session. Authenticated users are bounced off them.
pub const PUBLIC_ROUTES: [&str; 3] = [LOGIN_ROUTE, REGISTER_ROUTE, LANDING_ROUTE];

/// Outcome of a guard check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    RedirectTo(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

/// Strip the query string and fragment from a navigation target.
#[must_use]
pub fn route_path(to: &str) -> &str {
    let end = to.find(['?', '#']).unwrap_or(to.len());
    &to[..end]
}

#[must_use]
pub fn classify(to: &str) -> RouteClass {
    if PUBLIC_ROUTES.contains(&route_path(to)) { RouteClass::Public } else { RouteClass::Protected }
}

/// A check run by the router before a navigation is committed.
pub trait Middleware: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Decide whether navigation to `to` may proceed.
    fn before_navigate(&self, to: &str, session: &SessionStore) -> NavigationDecision;
}

// =============================================================================
// AUTH GUARD
// =============================================================================

/// Global guard enforcing public/protected access.
///
/// 1. Restore the credential from the cookie if memory has none.
/// 2. No credential on a protected route: redirect to `/login`.
/// 3. Credential on a public route: redirect to `/dashboard`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthGuard;

impl Middleware for AuthGuard {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn before_navigate(&self, to: &str, session: &SessionStore) -> NavigationDecision {
        session.restore_from_cookie();

        let authenticated = session.is_authenticated();
        match (authenticated, classify(to)) {
            (false, RouteClass::Protected) => NavigationDecision::RedirectTo(LOGIN_ROUTE.to_owned()),
            (true, RouteClass::Public) => NavigationDecision::RedirectTo(DASHBOARD_ROUTE.to_owned()),
            _ => NavigationDecision::Allow,
        }
    }
}

// =============================================================================
// ADMIN GUARD
// =============================================================================

/// Keeps non-administrators out of `/admin` routes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdminGuard;

impl AdminGuard {
    #[must_use]
    pub fn applies_to(to: &str) -> bool {
        let path = route_path(to);
        path == ADMIN_ROUTE_PREFIX || path.strip_prefix(ADMIN_ROUTE_PREFIX).is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Middleware for AdminGuard {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn before_navigate(&self, to: &str, session: &SessionStore) -> NavigationDecision {
        if !Self::applies_to(to) {
            return NavigationDecision::Allow;
        }
        if session.identity().is_some_and(|identity| identity.is_admin()) {
            NavigationDecision::Allow
        } else {
            NavigationDecision::RedirectTo(DASHBOARD_ROUTE.to_owned())
        }
    }
}
