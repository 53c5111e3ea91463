//! `/api/payments` routes. Intent creation and processing are public (the
//! storefront checkout drives them); confirmation, history, refunds and
//! analytics are admin-side and gated.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::identity::authenticate;
use crate::payments::{self, NewPaymentIntent, PaymentLedger};
use crate::query::{self, parse_date, ListParams, QueryRequest};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/methods", get(methods))
        .route("/create-intent", post(create_intent))
        .route("/history", get(history))
        .route("/analytics", get(analytics))
        .route("/{id}/status", get(status))
        .route("/{id}/process", post(process))
        .route("/{id}/confirm", post(confirm))
        .route("/{id}/refund", post(refund))
}

async fn methods() -> impl IntoResponse {
    Json(json!({ "data": PaymentLedger::methods() }))
}

async fn create_intent(
    State(state): State<AppState>,
    Json(body): Json<NewPaymentIntent>,
) -> AppResult<impl IntoResponse> {
    let intent = state.payments.create_intent(body)?;
    Ok((StatusCode::CREATED, Json(intent)))
}

async fn status(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<impl IntoResponse> {
    let intent = state
        .payments
        .get(&id)
        .ok_or_else(|| AppError::not_found("payment_missing", "Payment not found"))?;
    Ok(Json(json!({
        "paymentId": intent.id,
        "status": intent.status,
        "amount": intent.amount,
        "currency": intent.currency,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessBody {
    payment_method: Option<String>,
    payment_details: Option<Value>,
}

async fn process(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ProcessBody>,
) -> AppResult<impl IntoResponse> {
    let intent = state.payments.process(&id, body.payment_method, body.payment_details)?;
    Ok(Json(json!({
        "success": true,
        "paymentId": intent.id,
        "status": intent.status,
        "message": "Payment is being processed",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBody {
    confirmation_data: Option<Value>,
}

async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ConfirmBody>,
) -> AppResult<impl IntoResponse> {
    let admin = authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let intent = state.payments.confirm(&id, body.confirmation_data, &admin.id)?;
    Ok(Json(json!({
        "success": true,
        "paymentId": intent.id,
        "status": intent.status,
        "message": "Payment confirmed successfully",
    })))
}

async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let req = QueryRequest::from_params(&params, &["status"], "createdAt")?;
    let result = query::run(&state.payments.snapshot(), &req, &payments::query_spec());
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct RefundBody {
    amount: Option<i64>,
    reason: Option<String>,
}

async fn refund(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RefundBody>,
) -> AppResult<impl IntoResponse> {
    let admin = authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let refund = state.payments.refund(&id, body.amount, body.reason, &admin.id)?;
    Ok(Json(json!({
        "success": true,
        "refundId": refund.refund_id,
        "amount": refund.amount,
        "status": refund.status,
        "message": "Refund initiated successfully",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsParams {
    date_from: Option<String>,
    date_to: Option<String>,
}

async fn analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<impl IntoResponse> {
    authenticate(&headers, &state.auth.sessions, &state.auth.users)?;
    let from = params.date_from.as_deref().filter(|s| !s.is_empty()).map(parse_date).transpose()?;
    let to = params.date_to.as_deref().filter(|s| !s.is_empty()).map(parse_date).transpose()?;
    Ok(Json(json!({ "data": state.payments.analytics(from, to) })))
}
