use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use bomai_utils::{BomAiError, ErrorResponse, ExtractionError};

/// Handler error carrying a [`BomAiError`] to the client as an [`ErrorResponse`]
#[derive(Debug)]
pub struct ApiError(pub BomAiError);

impl From<BomAiError> for ApiError {
    fn from(error: BomAiError) -> Self {
        Self(error)
    }
}

impl From<ExtractionError> for ApiError {
    fn from(error: ExtractionError) -> Self {
        Self(error.into())
    }
}

/// Serializing a response body is a server fault, not a bad request
impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self(BomAiError::internal(error.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

/// Logs rejected and failed requests. The response passes through unchanged.
pub async fn error_handling_middleware(
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(%method, %uri, %status, "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %uri, %status, "Request rejected");
    }

    response
}
