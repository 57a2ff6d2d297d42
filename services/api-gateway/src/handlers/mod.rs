pub mod chat;
pub mod costing;
pub mod health;
pub mod query;
pub mod session;
pub mod shortage;

pub use chat::*;
pub use costing::*;
pub use health::*;
pub use query::*;
pub use session::*;
pub use shortage::*;

use axum::extract::Multipart;
use bomai_utils::{validate_file_size, validate_file_type, BomAiError, BomAiResult};

/// One file taken from a multipart upload
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Read the first file field and check its extension and size
pub async fn read_upload(
    multipart: &mut Multipart,
    allowed_types: &[&str],
    max_size: usize,
) -> BomAiResult<UploadedFile> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| BomAiError::validation("file", format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| BomAiError::validation("file", "No file provided"))?;

    let filename = field
        .file_name()
        .map(|name| name.to_string())
        .ok_or_else(|| BomAiError::validation("file", "Uploaded file has no name"))?;
    let content_type = field.content_type().map(|value| value.to_string());

    validate_file_type(&filename, allowed_types)?;

    let data = field
        .bytes()
        .await
        .map_err(|e| BomAiError::validation("file", format!("Failed to read file data: {}", e)))?;

    validate_file_size(data.len(), max_size)?;

    Ok(UploadedFile {
        filename,
        content_type,
        data: data.to_vec(),
    })
}
