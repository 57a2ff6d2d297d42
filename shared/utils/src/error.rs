use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input-shape failures of the costing decoder and shortage normalizer.
/// Expected and recoverable: the message is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionError {
    #[error("No line totals detected. The costing document format may differ from the expected layout.")]
    NoTotalsDetected,

    #[error("The \"Line Total\" table header was not found in the costing document.")]
    HeaderNotFound,

    #[error("Unrecognized spreadsheet shape: {reason}")]
    MalformedInput { reason: String },
}

impl ExtractionError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoTotalsDetected => "NO_TOTALS_DETECTED",
            Self::HeaderNotFound => "HEADER_NOT_FOUND",
            Self::MalformedInput { .. } => "MALFORMED_INPUT",
        }
    }
}

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BomAiError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Document processing error: {message}")]
    DocumentProcessing { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl BomAiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn document_processing(message: impl Into<String>) -> Self {
        Self::DocumentProcessing {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Extraction(inner) => inner.error_code(),
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DocumentProcessing { .. } => "DOCUMENT_PROCESSING_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Extraction(_) => 422,
            Self::Validation { .. } => 400,
            Self::DocumentProcessing { .. } => 422,
            Self::Configuration { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }
}

pub type BomAiResult<T> = Result<T, BomAiError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<BomAiError> for ErrorResponse {
    fn from(error: BomAiError) -> Self {
        let details = match &error {
            BomAiError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            _ => None,
        };

        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

impl From<serde_json::Error> for BomAiError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<config::ConfigError> for BomAiError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
