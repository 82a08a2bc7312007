//! Headcount Dashboard HTTP Server
//!
//! Serves cached Plotly chart fragments and JSON summaries of student and
//! academic-staff headcounts.
//!
//! # Endpoints
//!
//! ## Charts (HTML fragments)
//! - `GET /charts/staff-donut?session=&faculty=`
//! - `GET /charts/student-donut?session=&faculty=`
//! - `GET /charts/staff-trend?faculty=`
//! - `GET /charts/student-trend?faculty=`
//!
//! ## Data (JSON)
//! - `GET /api/academic-staff-count?session=&faculty=`
//! - `GET /api/student-distribution?session=&faculty=`
//! - `GET /api/academic-staff-growth?faculty=`
//! - `GET /api/student-population-trend?faculty=`
//!
//! ## Admin
//! - `GET /` - Health check
//! - `GET /cache/status` - Cache occupancy
//! - `POST /cache/clear` - Drop cached responses
//! - `GET /metrics` - Prometheus metrics
//!
//! # Configuration
//!
//! 1. `DASHBOARD_CONFIG` environment variable (path to TOML file)
//! 2. `./dashboard.toml` in current directory
//! 3. Defaults
//!
//! `DATABASE_URL`, `LISTEN_ADDR` and `CACHE_TTL_SECONDS` override the file. The
//! server refuses to start without a database URL.
//!
//! # Example
//!
//! ```bash
//! DATABASE_URL=postgres://oir@localhost/oir ./server
//!
//! curl "http://localhost:8000/charts/staff-donut?session=2023/2024"
//! curl -X POST http://localhost:8000/cache/clear
//! ```

mod config;
mod handlers;
mod timing;
mod types;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use headcount_dashboard::PgHeadcountStore;
use tokio::signal;
use tracing::{error, info};

use config::ServerConfig;
use handlers::AppState;

/// Build the router with all endpoints
fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and admin
        .route("/", get(handlers::root))
        .route("/metrics", get(handlers::metrics))
        .route("/cache/status", get(handlers::cache_status))
        .route("/cache/clear", post(handlers::cache_clear))
        // Charts
        .route("/charts/staff-donut", get(handlers::staff_donut))
        .route("/charts/student-donut", get(handlers::student_donut))
        .route("/charts/staff-trend", get(handlers::staff_trend))
        .route("/charts/student-trend", get(handlers::student_trend))
        // Data API
        .route("/api/academic-staff-count", get(handlers::api_staff_count))
        .route(
            "/api/student-distribution",
            get(handlers::api_student_distribution),
        )
        .route("/api/academic-staff-growth", get(handlers::api_staff_growth))
        .route(
            "/api/student-population-trend",
            get(handlers::api_student_trend),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            timing::request_timing,
        ))
        .with_state(state)
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("headcount_dashboard=info".parse()?)
                .add_directive("server=info".parse()?),
        )
        .init();

    info!("Headcount dashboard starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load().inspect_err(|e| {
        error!(error = %e, "Refusing to start");
    })?;
    info!("Listen address: {}", config.listen_addr);
    handlers::log_chart_settings(&config);

    let store = PgHeadcountStore::connect_lazy(&config.pool_config()?)?;
    info!(
        max_connections = config.db_max_connections,
        min_connections = config.db_min_connections,
        "Database pool configured"
    );

    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(Arc::new(store.clone()), config)?);
    let app = build_router(state);

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Server shutdown complete");
    Ok(())
}
