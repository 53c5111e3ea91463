//!
//! parfum HTTP server
//! ------------------
//! Axum-based REST API for the storefront and admin panel.
//!
//! Responsibilities:
//! - Bearer-token session model backed by the `identity` module.
//! - Route groups for auth, products, orders and payments under `/api`.
//! - First-run admin account and demo dataset creation.
//! - Startup banner and health endpoint.

use std::net::SocketAddr;
use std::time::Duration;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::error::AppError;
use crate::identity::{AuthService, CredentialStore, Role, SessionRegistry, User, DEFAULT_TTL};
use crate::orders::OrderBook;
use crate::payments::PaymentLedger;

pub mod auth;
pub mod orders;
pub mod payments;
pub mod products;

/// Shared server state injected into all handlers. Every member is a cheap
/// clone over its own interior lock, so handlers never contend on one big
/// state mutex.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub catalog: ProductCatalog,
    pub orders: OrderBook,
    pub payments: PaymentLedger,
}

/// Startup configuration, normally read from the environment in `main`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub session_ttl: Duration,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 3001,
            session_ttl: DEFAULT_TTL,
            admin_email: "admin@parfum.local".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

/// Ensure an admin account exists for the configured email. Only runs on an
/// empty store, so a restart never clobbers a changed password.
fn ensure_default_admin(users: &CredentialStore, cfg: &ServerConfig) -> anyhow::Result<()> {
    if users.find_by_email(&cfg.admin_email).is_some() {
        return Ok(());
    }
    users.insert(User {
        id: Uuid::new_v4().to_string(),
        email: cfg.admin_email.clone(),
        password_hash: CredentialStore::hash_secret(&cfg.admin_password),
        name: "Administrator".to_string(),
        role: Role::Admin,
        avatar: None,
        created_at: Utc::now(),
    })?;
    info!(email = %cfg.admin_email, "created default admin account");
    Ok(())
}

/// Build the shared state: empty stores, the default admin, and the demo
/// dataset for the catalog and order book.
pub fn build_state(cfg: &ServerConfig) -> anyhow::Result<AppState> {
    let users = CredentialStore::new();
    ensure_default_admin(&users, cfg)?;
    let sessions = SessionRegistry::new(cfg.session_ttl);

    let catalog = ProductCatalog::new();
    catalog.seed_demo();
    let orders = OrderBook::new();
    orders.seed_demo();

    Ok(AppState {
        auth: AuthService::new(users, sessions),
        catalog,
        orders,
        payments: PaymentLedger::new(),
    })
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "parfum-api", "timestamp": Utc::now() }))
}

async fn not_found() -> AppError {
    AppError::not_found("route_missing", "Route not found")
}

/// Assemble the full router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "parfum api ok" }))
        .route("/health", get(health))
        .nest("/api/auth", auth::router())
        .nest("/api/products", products::router())
        .nest("/api/orders", orders::router())
        .nest("/api/payments", payments::router())
        .fallback(not_found)
        .with_state(state)
}

/// Start the HTTP server bound to the configured port. Builds the state,
/// seeds first-run data and serves until the process is stopped.
pub async fn run_with_config(cfg: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg)?;
    info!(
        products = state.catalog.len(),
        orders = state.orders.len(),
        "startup inventory"
    );
    let app = app(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", cfg.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn run() -> anyhow::Result<()> {
    run_with_config(ServerConfig::default()).await
}
