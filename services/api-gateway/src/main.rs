use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    serve, Router,
};
use bomai_utils::{init_logging, AppConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

mod handlers;
mod intent;
mod metrics;
mod middleware;
mod pdf_processor;
mod routes;
mod session;

use handlers::{health_check, metrics_handler};
use metrics::Metrics;
use middleware::*;
use pdf_processor::PdfProcessor;
use session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting BOM AI API Gateway");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;

    // Build application router
    let app = create_app(config)?;

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("API Gateway listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn create_app(config: AppConfig) -> Result<Router> {
    Ok(create_router(create_state(config)?))
}

fn create_state(config: AppConfig) -> Result<AppState> {
    let metrics = Metrics::new(&config.monitoring.prometheus_namespace)
        .context("Failed to register metrics")?;
    let pdf = PdfProcessor::new(Duration::from_secs(config.server.timeout_seconds));

    Ok(AppState {
        sessions: SessionStore::new(),
        config: Arc::new(config),
        metrics,
        pdf,
    })
}

fn create_router(state: AppState) -> Router {
    let max_request_size = state.config.server.max_request_size;

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))

        // API routes
        .nest("/api/v1", routes::create_api_routes())

        // Middleware stack
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::DELETE])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(axum::middleware::from_fn(error_handling_middleware)),
        )

        // Application state
        .with_state(state)
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
    pub pdf: PdfProcessor,
}
