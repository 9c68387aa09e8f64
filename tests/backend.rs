//! End-to-end tests against a local axum backend over real HTTP.

use std::collections::HashMap;
use std::sync::Arc;

use activity_portal::app::AppContext;
use activity_portal::config::ClientConfig;
use activity_portal::cookies::{AUTH_COOKIE, CookieStore, FileCookieJar, MemoryCookieJar};
use activity_portal::features::activities::ActivityQuery;
use activity_portal::features::profile::{AVATAR_FIELD, AvatarUpload};
use activity_portal::net::api::ApiError;
use activity_portal::net::transport::ReqwestTransport;
use activity_portal::routing::DASHBOARD_ROUTE;
use activity_portal::state::session::INVALID_CREDENTIALS_MESSAGE;
use axum::extract::{Multipart, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

const TOKEN: &str = "tok-1";

// =============================================================
// Backend
// =============================================================

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})))
}

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.contains_key("authorization") {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "login must be anonymous"})));
    }
    if body["password"] == "secret" {
        let response = json!({"token": TOKEN, "userId": 1, "userName": "Root", "roleId": 1});
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Wrong password"})))
    }
}

async fn activities(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let category = query.get("category").cloned().unwrap_or_default();
    (StatusCode::OK, Json(json!([{"id": "12", "title": "Open mic", "category": category}])))
}

async fn avatar(headers: HeaderMap, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.unwrap();
        fields.push(json!({"name": name, "fileName": file_name, "contentType": content_type, "len": bytes.len()}));
    }
    (StatusCode::OK, Json(json!({"fields": fields})))
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({"id": 1, "name": "Root", "email": "root@example.com", "roleId": 1})))
}

async fn spawn_backend() -> String {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/activities", get(activities))
        .route("/users/me", get(me))
        .route("/users/me/avatar", post(avatar));
    let app = Router::new().nest("/api/v1", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

fn context(base: &str, cookies: Arc<dyn CookieStore>) -> AppContext {
    let config = ClientConfig::new(base).unwrap();
    AppContext::with_parts(config, Arc::new(ReqwestTransport::new()), cookies)
}

// =============================================================
// Session over HTTP
// =============================================================

#[tokio::test]
async fn login_then_fetch_sends_bearer_and_query() {
    let base = spawn_backend().await;
    let mut app = context(&base, Arc::new(MemoryCookieJar::new()));

    let response = app.login("root@example.com", "secret").await.unwrap();
    assert_eq!(response.user_id, 1);
    assert_eq!(app.router().current(), Some(DASHBOARD_ROUTE));
    assert!(app.session().identity().unwrap().is_admin());

    app.activities().refresh(&ActivityQuery::new().with("category", "music")).await;

    let state = app.activities().state();
    assert_eq!(state.error, None);
    assert_eq!(state.data.len(), 1);
    assert_eq!(state.data[0].id, 12);
    assert_eq!(state.data[0].category.as_deref(), Some("music"));
}

#[tokio::test]
async fn rejected_login_surfaces_backend_message() {
    let base = spawn_backend().await;
    let mut app = context(&base, Arc::new(MemoryCookieJar::new()));

    let err = app.login("root@example.com", "nope").await.unwrap_err();

    assert_eq!(err.message, "Wrong password");
    assert!(!app.session().is_authenticated());
}

#[tokio::test]
async fn stale_cookie_yields_http_401_in_error_slot() {
    let base = spawn_backend().await;
    let app = context(&base, Arc::new(MemoryCookieJar::with(AUTH_COOKIE, "stale")));
    assert!(app.session().restore_from_cookie());

    app.activities().refresh(&ActivityQuery::new()).await;

    let state = app.activities().state();
    assert!(state.data.is_empty());
    let err = state.error.unwrap();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.backend_message(), Some("unauthorized"));
}

#[tokio::test]
async fn avatar_upload_is_multipart() {
    let base = spawn_backend().await;
    let mut app = context(&base, Arc::new(MemoryCookieJar::new()));
    app.login("root@example.com", "secret").await.unwrap();

    let upload = AvatarUpload { file_name: "me.png".to_owned(), mime: Some("image/png".to_owned()), bytes: vec![7; 3] };
    let body = app.user().upload_avatar(upload).await.unwrap();

    assert_eq!(
        body["fields"],
        json!([{"name": AVATAR_FIELD, "fileName": "me.png", "contentType": "image/png", "len": 3}])
    );
    assert_eq!(app.user().profile().data().map(|p| p.email), Some("root@example.com".to_owned()));
}

// =============================================================
// Failure modes
// =============================================================

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base = format!("http://{addr}/api/v1");

    let mut app = context(&base, Arc::new(MemoryCookieJar::with(AUTH_COOKIE, TOKEN)));
    app.session().restore_from_cookie();
    let err = app.user().fetch_me().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");

    let _ = app.logout();
    let err = app.login("root@example.com", "secret").await.unwrap_err();
    assert_eq!(err.message, INVALID_CREDENTIALS_MESSAGE);
}

// =============================================================
// Persistence across contexts
// =============================================================

#[tokio::test]
async fn file_cookie_survives_a_new_context() {
    let base = spawn_backend().await;
    let path = std::env::temp_dir().join(format!("activity-portal-{}.json", uuid::Uuid::new_v4()));

    {
        let mut app = context(&base, Arc::new(FileCookieJar::open(&path).unwrap()));
        app.login("root@example.com", "secret").await.unwrap();
    }

    let mut app = context(&base, Arc::new(FileCookieJar::open(&path).unwrap()));
    let nav = app.navigate("/activities").unwrap();
    assert_eq!(nav.landed, "/activities");
    assert_eq!(app.user().fetch_me().await.unwrap().name, "Root");

    app.logout().unwrap();
    let app = context(&base, Arc::new(FileCookieJar::open(&path).unwrap()));
    assert!(!app.session().restore_from_cookie());

    let _ = std::fs::remove_file(&path);
}
