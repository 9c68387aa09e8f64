use reqwest::Method;
use serde_json::json;

use super::AppContext;
use super::test_helpers::{app_fixture, login_body, test_config};
use crate::cookies::{AUTH_COOKIE, CookieStore, MemoryCookieJar};
use crate::routing::{DASHBOARD_ROUTE, LOGIN_ROUTE};
use crate::state::session::INVALID_CREDENTIALS_MESSAGE;
use crate::state::toast::ToastKind;

// =============================================================
// Navigation
// =============================================================

#[tokio::test]
async fn anonymous_navigation_lands_on_login() {
    let (_transport, _cookies, mut app) = app_fixture(MemoryCookieJar::new());

    let nav = app.navigate("/dashboard").unwrap();

    assert_eq!(nav.landed, LOGIN_ROUTE);
    assert_eq!(app.router().current(), Some(LOGIN_ROUTE));
}

#[tokio::test]
async fn persisted_cookie_restores_session_on_first_navigation() {
    let (_transport, _cookies, mut app) = app_fixture(MemoryCookieJar::with(AUTH_COOKIE, "saved"));
    assert!(!app.session().is_authenticated());

    let nav = app.navigate("/").unwrap();

    assert_eq!(nav.landed, DASHBOARD_ROUTE);
    assert_eq!(app.session().credential().map(|t| t.as_str().to_owned()), Some("saved".to_owned()));
}

#[test]
fn corrupt_cookie_file_does_not_block_startup() {
    let path = std::env::temp_dir().join(format!("activity-portal-app-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, "{").unwrap();
    let mut config = test_config();
    config.cookie_path = Some(path.clone());

    let app = AppContext::from_config(config).unwrap();

    assert!(!app.session().restore_from_cookie());
    let _ = std::fs::remove_file(&path);
}

// =============================================================
// Login
// =============================================================

#[tokio::test]
async fn login_toasts_and_moves_to_dashboard() {
    let (transport, cookies, mut app) = app_fixture(MemoryCookieJar::new());
    transport.on(Method::POST, "/auth/login", 200, login_body("fresh"));

    let response = app.login("ada@example.com", "pw").await.unwrap();

    assert_eq!(response.user_name, "Ada");
    assert_eq!(app.router().current(), Some(DASHBOARD_ROUTE));
    assert_eq!(cookies.get(AUTH_COOKIE).as_deref(), Some("fresh"));
    let toast = app.toast().current();
    assert!(toast.visible);
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Welcome back, Ada");
}

#[tokio::test]
async fn failed_login_toasts_backend_message_and_stays_put() {
    let (transport, cookies, mut app) = app_fixture(MemoryCookieJar::new());
    transport.on(Method::POST, "/auth/login", 401, json!({"error": "Account locked"}));

    let err = app.login("ada@example.com", "pw").await.unwrap_err();

    assert_eq!(err.message, "Account locked");
    assert_eq!(app.router().current(), None);
    assert_eq!(cookies.get(AUTH_COOKIE), None);
    let toast = app.toast().current();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, "Account locked");
}

#[tokio::test]
async fn failed_login_without_backend_message_uses_generic_text() {
    let (transport, _cookies, mut app) = app_fixture(MemoryCookieJar::new());
    transport.on_raw(Method::POST, "/auth/login", 500, "oops");

    let err = app.login("ada@example.com", "pw").await.unwrap_err();

    assert_eq!(err.message, INVALID_CREDENTIALS_MESSAGE);
    assert_eq!(app.toast().current().message, INVALID_CREDENTIALS_MESSAGE);
}

// =============================================================
// Logout
// =============================================================

#[tokio::test]
async fn logout_lands_on_login_and_clears_cookie() {
    let (transport, cookies, mut app) = app_fixture(MemoryCookieJar::new());
    transport.on(Method::POST, "/auth/login", 200, login_body("fresh"));
    app.login("ada@example.com", "pw").await.unwrap();

    let nav = app.logout().unwrap().unwrap();

    assert_eq!(nav.landed, LOGIN_ROUTE);
    assert_eq!(app.router().current(), Some(LOGIN_ROUTE));
    assert!(!app.session().is_authenticated());
    assert_eq!(cookies.get(AUTH_COOKIE), None);

    // A protected route now bounces back to login.
    assert_eq!(app.navigate(DASHBOARD_ROUTE).unwrap().landed, LOGIN_ROUTE);
}

#[tokio::test]
async fn logout_when_anonymous_still_lands_on_login() {
    let (_transport, _cookies, mut app) = app_fixture(MemoryCookieJar::new());

    let nav = app.logout().unwrap().unwrap();

    assert_eq!(nav.landed, LOGIN_ROUTE);
}

// =============================================================
// Shared stores
// =============================================================

#[tokio::test]
async fn feature_resources_share_the_session() {
    let (transport, _cookies, mut app) = app_fixture(MemoryCookieJar::new());
    transport.on(Method::POST, "/auth/login", 200, login_body("fresh"));
    transport.on(Method::GET, "/notices", 200, json!([{"id": 1, "message": "hi"}]));

    app.notices().refresh(&()).await;
    assert!(app.notices().data().is_empty());

    app.login("ada@example.com", "pw").await.unwrap();
    assert!(app.notices().sync(&()).await);

    assert_eq!(app.notices().data().len(), 1);
    let last = transport.requests().pop().unwrap();
    assert_eq!(last.header("Authorization"), Some("Bearer fresh"));
}
