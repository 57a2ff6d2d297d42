//! Shortage Upload Handler
//!
//! Reads an uploaded shortage spreadsheet into canonical records and stores
//! them on the session.

use axum::{
    extract::{Multipart, Path, State},
    response::Json,
};
use bomai_models::{RawRow, ShortageRecord};
use bomai_utils::{log_error, BomAiError, SheetReader, ShortageNormalizer};
use serde::Serialize;
use uuid::Uuid;

use super::read_upload;
use crate::{middleware::ApiError, AppState};

const SHEET_TYPES: [&str; 4] = ["csv", "xlsx", "xls", "xml"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortageUploadResponse {
    /// Data rows read from the sheet, before filtering
    pub rows: usize,
    pub records: Vec<ShortageRecord>,
    pub warnings: Vec<String>,
}

/// POST /api/v1/sessions/:id/shortages
pub async fn upload_shortages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ShortageUploadResponse>, ApiError> {
    state.sessions.ensure_exists(session_id).await?;

    let upload = read_upload(&mut multipart, &SHEET_TYPES, state.config.server.max_request_size).await?;

    let sheet = match SheetReader::new().read_bytes(
        &upload.filename,
        upload.content_type.as_deref(),
        &upload.data,
        None,
    ) {
        Ok(sheet) => sheet,
        Err(e) => {
            log_error!(e, "Shortage spreadsheet could not be read", session_id = %session_id, filename = %upload.filename);
            state.metrics.record_upload("shortage", false);
            return Err(BomAiError::document_processing("Failed to analyse shortage spreadsheet").into());
        }
    };

    let shortage = &state.config.shortage;
    let normalizer = ShortageNormalizer::new()
        .with_mode(shortage.mode)
        .with_aliases(shortage.aliases.clone());

    let rows: Vec<RawRow> = if state.config.costing.filter_enabled {
        let filter = &state.config.costing.filter;
        sheet
            .rows
            .iter()
            .filter(|row| filter.admits_row(row, normalizer.aliases()))
            .cloned()
            .collect()
    } else {
        sheet.rows.clone()
    };

    let normalized = normalizer.normalize_strict(&rows);
    state.metrics.record_upload("shortage", normalized.is_ok());
    let records = normalized?;

    tracing::info!(
        %session_id,
        filename = %sheet.filename,
        format = sheet.format.as_str(),
        rows = sheet.rows.len(),
        records = records.len(),
        "Shortage spreadsheet analysed"
    );

    state.sessions.replace_records(session_id, records.clone()).await?;
    Ok(Json(ShortageUploadResponse {
        rows: sheet.rows.len(),
        records,
        warnings: sheet.parse_warnings,
    }))
}
