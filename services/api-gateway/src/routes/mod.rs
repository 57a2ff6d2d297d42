use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health/detailed", get(detailed_health_check))
        .nest("/sessions", session_routes())
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", delete(delete_session))
        .route("/:id/costing", post(upload_costing))
        .route("/:id/shortages", post(upload_shortages).get(get_shortages))
        .route("/:id/cost", get(get_cost))
        .route("/:id/order-priority", get(get_order_priority))
        .route("/:id/kit-risk", get(get_kit_risk))
        .route("/:id/chat", post(chat))
}
