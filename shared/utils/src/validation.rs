use crate::error::{BomAiError, BomAiResult};
use chrono::NaiveDate;
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> BomAiResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(BomAiError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> BomAiResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(BomAiError::validation(
            "file_type",
            format!("File type '{}' not allowed. Allowed types: {}", extension, allowed_types.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: usize, max_size: usize) -> BomAiResult<()> {
    if file_size == 0 {
        return Err(BomAiError::validation("file_size", "Uploaded file is empty"));
    }

    if file_size > max_size {
        return Err(BomAiError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}

/// Kit dates are ISO calendar dates (`YYYY-MM-DD`)
pub fn parse_kit_date(value: &str) -> BomAiResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        BomAiError::validation("kit_date", format!("'{}' is not a date in YYYY-MM-DD form", value.trim()))
    })
}
