use axum::{extract::{Path, State}, http::StatusCode, response::Json};
use serde::Serialize;
use uuid::Uuid;

use crate::{middleware::ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// POST /api/v1/sessions
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.sessions.create().await;
    tracing::info!(%session_id, "Session created");

    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

/// DELETE /api/v1/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(session_id).await?;
    tracing::info!(%session_id, "Session removed");

    Ok(StatusCode::NO_CONTENT)
}
