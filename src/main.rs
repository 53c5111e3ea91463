use std::time::Duration;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use parfum::identity::DEFAULT_TTL;
use parfum::server::{self, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let defaults = ServerConfig::default();
    let cfg = ServerConfig {
        http_port: std::env::var("PARFUM_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.http_port),
        session_ttl: std::env::var("PARFUM_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL),
        admin_email: std::env::var("PARFUM_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
        admin_password: std::env::var("PARFUM_ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
    };

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "parfum",
        "parfum starting: RUST_LOG='{}', http_port={}, session_ttl={}s, admin='{}'",
        rust_log,
        cfg.http_port,
        cfg.session_ttl.as_secs(),
        cfg.admin_email
    );

    server::run_with_config(cfg).await
}
