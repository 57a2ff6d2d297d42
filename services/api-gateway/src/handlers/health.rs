use axum::{extract::State, http::StatusCode, response::Json};
use bomai_utils::log_error;
use serde_json::{json, Value};

use crate::AppState;

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "bomai-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /api/v1/health/detailed
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<Value> {
    let active_sessions = state.sessions.len().await;

    Json(json!({
        "status": "healthy",
        "service": "bomai-api-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "sessions": { "status": "healthy", "active": active_sessions },
            "costing": {
                "defaultStrategy": state.config.costing.strategy,
                "filterEnabled": state.config.costing.filter_enabled
            },
            "shortage": { "mode": state.config.shortage.mode }
        }
    }))
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    if !state.config.monitoring.metrics_enabled {
        return Err(StatusCode::NOT_FOUND);
    }

    state.metrics.encode().map_err(|e| {
        log_error!(e, "Failed to encode metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
