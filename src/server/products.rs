//! `/api/products` routes. Reads are public; every mutation goes through the
//! authentication gate.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::catalog::{self, ProductDraft, StockOp};
use crate::error::{AppError, AppResult};
use crate::identity::authenticate;
use crate::query::{self, ListParams, QueryRequest};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/featured", get(featured))
        .route("/new", get(newest))
        .route("/categories", get(categories))
        .route("/bulk-delete", post(bulk_delete))
        .route("/{id}", get(get_one).put(update).delete(delete_one))
        .route("/{id}/stock", patch(set_stock))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let req = QueryRequest::from_params(&params, &["category", "status"], "createdAt")?;
    let result = query::run(&state.catalog.snapshot(), &req, &catalog::query_spec());
    Ok(Json(result))
}

async fn featured(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "data": state.catalog.featured() }))
}

async fn newest(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "data": state.catalog.newest() }))
}

async fn categories(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "data": state.catalog.category_counts() }))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<impl IntoResponse> {
    let product = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::not_found("product_missing", "Product not found"))?;
    Ok(Json(product))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let product = state.catalog.create(draft)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "data": product, "message": "Product created successfully" })),
    ))
}

async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let product = state.catalog.update(&id, draft)?;
    Ok(Json(json!({ "data": product, "message": "Product updated successfully" })))
}

async fn delete_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    state.catalog.delete(&id)?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

#[derive(Debug, Deserialize)]
struct BulkDeleteBody {
    ids: Option<Vec<String>>,
}

async fn bulk_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<BulkDeleteBody>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let Some(ids) = body.ids else {
        return Err(AppError::user("missing_fields", "IDs array is required"));
    };
    let removed = state.catalog.bulk_delete(&ids);
    Ok(Json(json!({
        "data": removed,
        "message": format!("{} products deleted successfully", removed.len()),
    })))
}

#[derive(Debug, Deserialize)]
struct StockBody {
    stock: Option<i64>,
    operation: Option<StockOp>,
}

async fn set_stock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StockBody>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let Some(amount) = body.stock else {
        return Err(AppError::user("missing_fields", "Stock value is required"));
    };
    let product = state.catalog.set_stock(&id, amount, body.operation.unwrap_or(StockOp::Set))?;
    Ok(Json(json!({ "data": product, "message": "Stock updated successfully" })))
}
