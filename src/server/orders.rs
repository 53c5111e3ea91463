//! `/api/orders` routes. Order creation and customer-facing reads are public
//! (the storefront has no account requirement); the admin listing and all
//! mutations go through the authentication gate.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::identity::authenticate;
use crate::orders::{self, NewOrder, OrderPatch};
use crate::query::{self, ListParams, QueryRequest};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/users/{user_id}", get(list_for_user))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
        .route("/{id}/status", patch(set_status))
        .route("/{id}/payment-status", patch(set_payment_status))
        .route("/{id}/tracking", patch(set_tracking))
}

async fn create(State(state): State<AppState>, Json(body): Json<NewOrder>) -> AppResult<impl IntoResponse> {
    let order = state.orders.create(body)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "data": order, "message": "Order created successfully" })),
    ))
}

/// Admin listing with the full search/filter/sort/paginate surface.
async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let req = QueryRequest::from_params(&params, &["status"], "createdAt")?;
    let result = query::run(&state.orders.snapshot(), &req, &orders::query_spec());
    Ok(Json(result))
}

/// Orders for a given storefront user. The demo dataset carries no per-user
/// ownership, so the id only scopes the route shape; filtering and paging
/// still apply.
async fn list_for_user(
    State(state): State<AppState>,
    Path(_user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let req = QueryRequest::from_params(&params, &["status"], "createdAt")?;
    let result = query::run(&state.orders.snapshot(), &req, &orders::query_spec());
    Ok(Json(result))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<impl IntoResponse> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::not_found("order_missing", "Order not found"))?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: Option<String>,
}

async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let Some(status) = body.status else {
        return Err(AppError::user("missing_fields", "Status is required"));
    };
    let order = state.orders.set_status(&id, status)?;
    Ok(Json(json!({ "data": order, "message": "Order status updated successfully" })))
}

async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let order = state.orders.update(&id, patch)?;
    Ok(Json(json!({ "data": order, "message": "Order updated successfully" })))
}

async fn delete_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    state.orders.delete(&id)?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}

async fn set_payment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let Some(status) = body.status else {
        return Err(AppError::user("missing_fields", "Payment status is required"));
    };
    let order = state.orders.set_payment_status(&id, status)?;
    Ok(Json(json!({ "data": order, "message": "Payment status updated successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingBody {
    tracking_number: Option<String>,
    carrier: Option<String>,
}

async fn set_tracking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<TrackingBody>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let Some(number) = body.tracking_number else {
        return Err(AppError::user("missing_fields", "Tracking number is required"));
    };
    let order = state.orders.set_tracking(&id, number, body.carrier)?;
    Ok(Json(json!({ "data": order, "message": "Tracking information updated successfully" })))
}
