use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use bomai_models::{CostSummary, KitDateAssessment, ShortageRecord};
use bomai_utils::parse_kit_date;
use serde::Deserialize;
use uuid::Uuid;

use crate::{middleware::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct KitRiskParams {
    pub kit_date: String,
}

/// GET /api/v1/sessions/:id/cost
pub async fn get_cost(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CostSummary>, ApiError> {
    let summary = state.sessions.read(session_id, |s| s.queries().total_cost()).await?;
    state.metrics.record_query("cost");
    Ok(Json(summary))
}

/// GET /api/v1/sessions/:id/shortages
pub async fn get_shortages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<ShortageRecord>>, ApiError> {
    let short = state.sessions.read(session_id, |s| s.queries().shortages()).await?;
    state.metrics.record_query("shortages");
    Ok(Json(short))
}

/// GET /api/v1/sessions/:id/order-priority
pub async fn get_order_priority(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<ShortageRecord>>, ApiError> {
    let ranked = state.sessions.read(session_id, |s| s.queries().order_priority()).await?;
    state.metrics.record_query("order_priority");
    Ok(Json(ranked))
}

/// GET /api/v1/sessions/:id/kit-risk?kit_date=YYYY-MM-DD
pub async fn get_kit_risk(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<KitRiskParams>,
) -> Result<Json<KitDateAssessment>, ApiError> {
    let kit_date = parse_kit_date(&params.kit_date)?;
    let assessment = state
        .sessions
        .read(session_id, |s| s.queries().kit_date_risk_today(kit_date))
        .await?;
    state.metrics.record_query("kit_risk");
    Ok(Json(assessment))
}
