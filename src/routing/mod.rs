//! Client-side routing: route classification, guard middleware, router.
//!
//! SYSTEM CONTEXT
//! ==============
//! `guard` decides per navigation whether the target may render, `router`
//! runs the guard chain and follows redirects until a route is allowed.

pub mod guard;
pub mod router;

pub use guard::{AdminGuard, AuthGuard, Middleware, NavigationDecision, RouteClass, classify};
pub use router::{Navigation, Router, RouterError};

/// Login page; unauthenticated users are sent here.
pub const LOGIN_ROUTE: &str = "/login";
/// Registration page.
pub const REGISTER_ROUTE: &str = "/register";
/// Public landing page.
pub const LANDING_ROUTE: &str = "/";
/// Authenticated landing page.
pub const DASHBOARD_ROUTE: &str = "/dashboard";
/// Prefix of routes restricted to administrators.
pub const ADMIN_ROUTE_PREFIX: &str = "/admin";
