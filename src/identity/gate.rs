//! Bearer-token authentication gate. Runs before every protected handler:
//! header → registry lookup → store lookup, rejecting with 401 at each step.

use axum::http::{header, HeaderMap};

use super::session::SessionRegistry;
use super::store::CredentialStore;
use super::user::User;
use crate::error::{AppError, AppResult};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix(BEARER_PREFIX)
}

/// Resolve the caller's identity or fail with `Auth`. Pure apart from the
/// lazy-expiry eviction inherited from the registry lookup. Resolving through
/// the store on every request means a deleted subject invalidates all of its
/// outstanding tokens with no explicit cascade.
pub fn authenticate(
    headers: &HeaderMap,
    sessions: &SessionRegistry,
    users: &CredentialStore,
) -> AppResult<User> {
    let Some(token) = bearer_token(headers) else {
        return Err(AppError::auth("no_token", "No token provided"));
    };
    let Some(subject_id) = sessions.validate(token) else {
        return Err(AppError::auth("token_invalid", "Token expired or invalid"));
    };
    users
        .find_by_id(&subject_id)
        .ok_or_else(|| AppError::auth("user_missing", "User not found"))
}
