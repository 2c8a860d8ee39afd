//! Integration tests for the request pipeline.
//!
//! These drive the assembled router directly with `tower::ServiceExt`, so
//! they cover the origin gatekeeper, the liveness endpoint, and the
//! collaborator mount points without a live server or database. The
//! database handle is a lazy pool that never actually connects.

use authgate::db::Repository;
use authgate::origin::{AllowedOrigins, DEV_ORIGIN};
use authgate::routes::{self, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use axum_extra::extract::CookieJar;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

const FRONTEND: &str = "https://app.example.com";

fn test_state() -> Arc<AppState> {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/authgate_test")
        .expect("lazy pool");
    Arc::new(AppState {
        repository: Repository::new(pool),
    })
}

/// Router with default (empty) collaborators and the configured frontend.
fn test_app() -> Router {
    routes::create_router(
        test_state(),
        AllowedOrigins::from_config(Some(FRONTEND)),
        Router::new(),
        Router::new(),
    )
}

/// Router whose auth collaborator counts how often it is invoked.
fn counting_app(hits: Arc<AtomicUsize>) -> Router {
    let auth = Router::new().route(
        "/login",
        post(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                "ok"
            }
        }),
    );
    routes::create_router(
        test_state(),
        AllowedOrigins::from_config(Some(FRONTEND)),
        auth,
        Router::new(),
    )
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_liveness_without_origin() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Non-browser request: no CORS headers are stamped.
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    assert_eq!(body_bytes(response).await, b"API WORKING");
}

#[tokio::test]
async fn test_allowed_origin_gets_credentialed_headers() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, DEV_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        DEV_ORIGIN
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn test_configured_frontend_origin_allowed() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, FRONTEND)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        FRONTEND
    );
}

#[tokio::test]
async fn test_denied_origin_short_circuits_collaborators() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_app(hits.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "ORIGIN_REJECTED");
}

#[tokio::test]
async fn test_allowed_origin_reaches_collaborator() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_app(hits.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::ORIGIN, DEV_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_collaborator_receives_json_and_cookies() {
    async fn echo(jar: CookieJar, Json(payload): Json<Value>) -> Json<Value> {
        let token = jar.get("token").map(|c| c.value().to_string());
        Json(json!({ "token": token, "email": payload["email"] }))
    }

    let user = Router::new().route("/data", post(echo));
    let app = routes::create_router(
        test_state(),
        AllowedOrigins::from_config(None),
        Router::new(),
        user,
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/user/data")
                .header(header::ORIGIN, DEV_ORIGIN)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, "token=abc123")
                .body(Body::from(r#"{"email":"user@example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["token"], "abc123");
    assert_eq!(body["email"], "user@example.com");
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/auth/login")
                .header(header::ORIGIN, DEV_ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        DEV_ORIGIN
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "content-type"
    );
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .is_some());
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_denied() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/auth/login")
                .header(header::ORIGIN, "http://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_route_without_origin_falls_through() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The gatekeeper passes it through; routing decides the status.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
