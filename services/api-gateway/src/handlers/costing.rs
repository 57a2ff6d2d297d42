//! Costing Upload Handler
//!
//! Decodes an uploaded costing PDF and stores its total on the session.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use bomai_models::{CostingExtractionResult, CostingStrategy};
use bomai_utils::{extract_costing, extract_costing_filtered, log_error, BomAiError};
use serde::Deserialize;
use uuid::Uuid;

use super::read_upload;
use crate::{middleware::ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CostingParams {
    pub strategy: Option<String>,
}

/// POST /api/v1/sessions/:id/costing?strategy=line_anchored|header_anchored
pub async fn upload_costing(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<CostingParams>,
    mut multipart: Multipart,
) -> Result<Json<CostingExtractionResult>, ApiError> {
    state.sessions.ensure_exists(session_id).await?;

    let strategy = match params.strategy.as_deref() {
        Some(value) => value
            .parse::<CostingStrategy>()
            .map_err(|message| BomAiError::validation("strategy", message))?,
        None => state.config.costing.strategy,
    };

    let upload = read_upload(&mut multipart, &["pdf"], state.config.server.max_request_size).await?;
    let filename = upload.filename;

    let text = match state.pdf.extract_text(upload.data).await {
        Ok(text) => text,
        Err(e) => {
            log_error!(e, "Costing document could not be read", session_id = %session_id, filename = %filename);
            state.metrics.record_upload("costing", false);
            return Err(BomAiError::document_processing("Failed to analyse costing document").into());
        }
    };

    let decoded = if state.config.costing.filter_enabled {
        extract_costing_filtered(&text, strategy, &state.config.costing.filter)
    } else {
        extract_costing(&text, strategy)
    };
    state.metrics.record_upload("costing", decoded.is_ok());
    let costing = decoded?;

    tracing::info!(
        %session_id,
        %filename,
        strategy = %strategy,
        lines = costing.line_count(),
        total = %costing.formatted_total(),
        "Costing document analysed"
    );

    state.sessions.replace_costing(session_id, costing.clone()).await?;
    Ok(Json(costing))
}
