//! Chat Handler
//!
//! Answers a free-text question by classifying it onto one build query.

use axum::{
    extract::{Path, State},
    response::Json,
};
use bomai_utils::{parse_kit_date, BomAiError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    intent::{self, Intent},
    middleware::ApiError,
    AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub kit_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub intent: Intent,
    pub reply: String,
    /// Structured answer of the query behind the reply, if one ran
    pub data: Value,
}

/// POST /api/v1/sessions/:id/chat
pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(BomAiError::validation("message", "Message must not be empty").into());
    }

    let intent = Intent::classify(&request.message);
    tracing::debug!(%session_id, intent = intent.as_str(), "Chat message classified");

    let (reply, data) = match intent {
        Intent::Cost => {
            let summary = state.sessions.read(session_id, |s| s.queries().total_cost()).await?;
            (intent::cost_reply(&summary), serde_json::to_value(&summary)?)
        }
        Intent::Shortages => {
            let short = state.sessions.read(session_id, |s| s.queries().shortages()).await?;
            (intent::shortages_reply(&short), serde_json::to_value(&short)?)
        }
        Intent::OrderPriority => {
            let ranked = state.sessions.read(session_id, |s| s.queries().order_priority()).await?;
            (intent::order_priority_reply(&ranked), serde_json::to_value(&ranked)?)
        }
        Intent::KitRisk => match request.kit_date.as_deref().map(parse_kit_date).transpose()? {
            Some(kit_date) => {
                let assessment = state
                    .sessions
                    .read(session_id, |s| s.queries().kit_date_risk_today(kit_date))
                    .await?;
                (intent::kit_risk_reply(&assessment), serde_json::to_value(&assessment)?)
            }
            None => {
                state.sessions.ensure_exists(session_id).await?;
                (intent::KIT_DATE_REQUIRED_REPLY.to_string(), Value::Null)
            }
        },
        Intent::Help => {
            state.sessions.ensure_exists(session_id).await?;
            (intent::HELP_REPLY.to_string(), Value::Null)
        }
    };

    if intent != Intent::Help {
        state.metrics.record_query(intent.as_str());
    }

    Ok(Json(ChatResponse { intent, reply, data }))
}
