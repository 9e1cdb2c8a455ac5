use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::{FluxoraError, FluxoraResult};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Multipart body split into file parts and plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> FluxoraResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(|s| s.to_string()) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let data = field.bytes().await?;
                    form.files.push(UploadedFile {
                        field: name,
                        filename: safe_file_name(&filename),
                        content_type,
                        data: data.to_vec(),
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn field(&self, name: &str) -> FluxoraResult<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FluxoraError::validation(name, format!("Field '{}' is required", name)))
    }

    /// Exactly one uploaded file.
    pub fn single_file(mut self) -> FluxoraResult<UploadedFile> {
        match self.files.len() {
            0 => Err(FluxoraError::validation("file", "No file provided")),
            1 => Ok(self.files.remove(0)),
            n => Err(FluxoraError::validation(
                "file",
                format!("Expected one file, got {}", n),
            )),
        }
    }
}

/// Final path component only, so client paths never leak into ids or logs.
pub fn safe_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() {
        "unknown".to_string()
    } else {
        base.to_string()
    }
}
