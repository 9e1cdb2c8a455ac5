use axum::{
    extract::{Multipart, State},
    response::Json,
};
use fluxora_models::{
    catalogue, cultural_context_description, language_label, CatalogueEntry, DocumentType,
    CULTURAL_CONTEXTS, LANGUAGES,
};
use fluxora_utils::{FluxoraError, FluxoraResult, UploadForm};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{detect_document_type, AppState};

pub async fn list_languages() -> Json<Vec<CatalogueEntry>> {
    Json(catalogue(LANGUAGES))
}

pub async fn list_contexts() -> Json<Vec<CatalogueEntry>> {
    Json(catalogue(CULTURAL_CONTEXTS))
}

#[derive(Debug, Serialize)]
pub struct LocalizationResponse {
    pub document_id: Uuid,
    pub filename: String,
    pub language: String,
    pub language_label: String,
    pub context: String,
    pub context_description: String,
    pub document_type: DocumentType,
    pub elements: usize,
    pub summary: String,
    pub message: String,
}

/// Multipart fields: `file` (PDF), `language`, `context`.
pub async fn localize_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> FluxoraResult<Json<LocalizationResponse>> {
    let form = UploadForm::read(multipart).await?;

    let language = form.field("language")?.to_string();
    let label = language_label(&language).ok_or_else(|| {
        FluxoraError::validation("language", format!("Unsupported language '{}'", language))
    })?;
    let context = form.field("context")?.to_string();
    let description = cultural_context_description(&context).ok_or_else(|| {
        FluxoraError::validation("context", format!("Unknown cultural context '{}'", context))
    })?;

    let file = form.single_file()?;
    let document = state
        .processor
        .process_document(&file.filename, &file.data)
        .await?;
    state.index.add_documents(&document.elements).await?;

    let document_type = detect_document_type(&document.elements);
    let summary = state
        .localizer
        .generate_localized_summary(&document.elements, &language, &context)
        .await;

    info!(
        document_id = %document.id,
        language = %language,
        context = %context,
        %document_type,
        "Localized document"
    );

    Ok(Json(LocalizationResponse {
        document_id: document.id,
        filename: document.filename.clone(),
        language_label: label.to_string(),
        context_description: description.to_string(),
        document_type,
        elements: document.elements.len(),
        message: format!(
            "Successfully processed and localized document with {} elements",
            document.elements.len()
        ),
        summary,
        language,
        context,
    }))
}
