//! `/api/auth` routes: login, register, current user, token refresh, logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::identity::{authenticate, bearer_token, PublicUser};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> AppResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::user("missing_fields", "Email and password are required"));
    };
    let outcome = state.auth.login(&email, &password)?;
    Ok(Json(json!({
        "token": outcome.token,
        "user": PublicUser::from(&outcome.user),
        "message": "Login successful",
    })))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> AppResult<impl IntoResponse> {
    let (Some(email), Some(password), Some(name)) = (body.email, body.password, body.name) else {
        return Err(AppError::user("missing_fields", "Email, password, and name are required"));
    };
    let outcome = state.auth.register(&email, &password, &name)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": outcome.token,
            "user": PublicUser::from(&outcome.user),
            "message": "Registration successful",
        })),
    ))
}

/// The body is the bare user object, credential field stripped.
async fn me(State(state): State<AppState>, headers: HeaderMap) -> AppResult<impl IntoResponse> {
    let user = authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    Ok(Json(PublicUser::from(&user)))
}

/// Issue a fresh token; the presented one stays valid until its own expiry.
async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> AppResult<impl IntoResponse> {
    let user = authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let token = state.auth.refresh(&user);
    Ok(Json(json!({
        "token": token,
        "message": "Token refreshed successfully",
    })))
}

/// Revokes exactly the presented token. Succeeds even if the token is already
/// gone, so logout is idempotent.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<impl IntoResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token);
    }
    Ok(Json(json!({ "message": "Logged out successfully" })))
}
