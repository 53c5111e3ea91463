//! Wire-shape tests driving the assembled router, asserting the exact JSON
//! bodies the auth endpoints put on the wire.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use parfum::server::{app, build_state, AppState, ServerConfig};

fn state_with_admin() -> (AppState, String) {
    let cfg = ServerConfig::default();
    let state = build_state(&cfg).unwrap();
    let token = state.auth.login(&cfg.admin_email, &cfg.admin_password).unwrap().token;
    (state, token)
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn me_returns_the_bare_user_object() {
    let (state, token) = state_with_admin();
    let response = app(state)
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    // Top-level user fields, no wrapper and no credential material.
    assert_eq!(body["email"], "admin@parfum.local");
    assert_eq!(body["role"], "admin");
    assert!(body.get("user").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn refresh_returns_token_and_message_only() {
    let (state, token) = state_with_admin();
    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert!(body["token"].is_string());
    assert_eq!(body["message"], "Token refreshed successfully");
    assert!(body.get("user").is_none());
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn unauthenticated_me_renders_the_error_envelope() {
    let (state, _) = state_with_admin();
    let response = app(state)
        .oneshot(Request::builder().uri("/api/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"]["message"], "No token provided");
    assert_eq!(body["error"]["status"], 401);
}
