use crate::error::{FluxoraError, FluxoraResult};
use regex::Regex;
use validator::{Validate, ValidationErrors};

const PDF_MAGIC: &[u8] = b"%PDF";

pub fn validate_model<T: Validate>(model: &T) -> FluxoraResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(FluxoraError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Length validation failed for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("required") => {
                    format!("Field '{}' is required", field)
                }
                std::borrow::Cow::Borrowed("url") => format!("Field '{}' must be a URL", field),
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Accepts only non-empty uploads that carry the PDF signature.
pub fn validate_pdf_upload(file_name: &str, data: &[u8]) -> FluxoraResult<()> {
    if data.is_empty() {
        return Err(FluxoraError::validation(
            "file",
            format!("Uploaded file '{}' is empty", file_name),
        ));
    }

    if !data.starts_with(PDF_MAGIC) {
        return Err(FluxoraError::validation(
            "file",
            format!("Uploaded file '{}' is not a PDF document", file_name),
        ));
    }

    Ok(())
}

pub fn validate_youtube_url(url: &str) -> FluxoraResult<()> {
    let youtube_regex = Regex::new(
        r"^(https?://)?(www\.|m\.|music\.)?(youtube\.com/(watch\?|shorts/|embed/|live/)|youtu\.be/)\S+$",
    )
    .map_err(|e| FluxoraError::internal(e.to_string()))?;

    if !youtube_regex.is_match(url.trim()) {
        return Err(FluxoraError::validation(
            "url",
            "Please enter a valid YouTube URL",
        ));
    }

    Ok(())
}

pub fn validate_uuid(uuid_str: &str) -> FluxoraResult<uuid::Uuid> {
    uuid::Uuid::parse_str(uuid_str)
        .map_err(|_| FluxoraError::validation("uuid", "Invalid UUID format"))
}

pub fn validate_non_empty(field: &str, value: &str) -> FluxoraResult<()> {
    if value.trim().is_empty() {
        return Err(FluxoraError::validation(
            field,
            format!("Field '{}' must not be empty", field),
        ));
    }
    Ok(())
}
