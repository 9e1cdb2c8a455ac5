use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use fluxora_models::{ChatMessage, ChatSession, DocumentSummary, Element, RetrievedChunk};
use fluxora_utils::{validate_model, FluxoraError, FluxoraResult, UploadForm};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let session = ChatSession::new();
    let response = SessionResponse {
        session_id: session.id,
        created_at: session.created_at,
    };
    if let Some(evicted) = state.sessions.write().await.insert(session.id, session) {
        info!(session_id = %evicted, "Evicted oldest chat session");
    }
    info!(session_id = %response.session_id, "Created chat session");

    (StatusCode::CREATED, Json(response))
}

#[derive(Debug, Serialize)]
pub struct FileResult {
    pub document_id: Uuid,
    pub filename: String,
    pub elements: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub documents: usize,
    pub elements: usize,
    pub files: Vec<FileResult>,
    pub message: String,
}

/// Process every uploaded PDF, then index all of their elements together.
pub async fn upload_documents(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> FluxoraResult<Json<UploadResponse>> {
    ensure_session(&state, session_id).await?;

    let form = UploadForm::read(multipart).await?;
    if form.files.is_empty() {
        return Err(FluxoraError::validation("file", "No files provided"));
    }

    let mut processed = Vec::with_capacity(form.files.len());
    for file in &form.files {
        let document = state
            .processor
            .process_document(&file.filename, &file.data)
            .await
            .map_err(|e| {
                error!(session_id = %session_id, filename = %file.filename, error = %e, "Error processing documents");
                e
            })?;
        processed.push(document);
    }

    let elements: Vec<Element> = processed
        .iter()
        .flat_map(|document| document.elements.iter().cloned())
        .collect();
    state.index.add_documents(&elements).await?;

    let files: Vec<FileResult> = processed
        .iter()
        .map(|document| FileResult {
            document_id: document.id,
            filename: document.filename.clone(),
            elements: document.elements.len(),
        })
        .collect();

    if let Some(session) = state.sessions.write().await.get_mut(&session_id) {
        session.documents_processed = true;
        session.document_ids.extend(files.iter().map(|f| f.document_id));
    }
    {
        let mut documents = state.documents.write().await;
        for document in processed {
            documents.insert(document.id, document);
        }
    }

    info!(
        session_id = %session_id,
        documents = files.len(),
        elements = elements.len(),
        "Processed uploaded documents"
    );

    Ok(Json(UploadResponse {
        session_id,
        documents: files.len(),
        elements: elements.len(),
        message: format!(
            "Successfully analyzed {} documents with {} elements",
            files.len(),
            elements.len()
        ),
        files,
    }))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> FluxoraResult<Json<Vec<ChatMessage>>> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or_else(|| FluxoraError::not_found(format!("Session {}", session_id)))?;
    Ok(Json(session.messages.clone()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatBody {
    #[validate(length(min = 1, message = "Query must not be empty"))]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<RetrievedChunk>,
}

pub async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<ChatBody>,
) -> FluxoraResult<Json<ChatResponse>> {
    validate_model(&body)?;
    let query = body.query.trim().to_string();
    if query.is_empty() {
        return Err(FluxoraError::validation("query", "Query must not be empty"));
    }

    let history = {
        let sessions = state.sessions.read().await;
        let session = sessions
            .get(&session_id)
            .ok_or_else(|| FluxoraError::not_found(format!("Session {}", session_id)))?;
        if !session.documents_processed {
            return Err(FluxoraError::conflict(
                "Please upload and process documents to start chatting.",
            ));
        }
        session.messages.clone()
    };

    let (answer, sources) = match state.index.query(&query, state.retrieval_k).await {
        Ok(results) => {
            let answer = state.chat.get_response(&query, &results, &history).await;
            (answer, results)
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Retrieval failed");
            (
                format!("Sorry sir but there is an error generating response: {}", e),
                Vec::new(),
            )
        }
    };

    if let Some(session) = state.sessions.write().await.get_mut(&session_id) {
        session.push(ChatMessage::user(query));
        session.push(ChatMessage::assistant(answer.clone()));
    }

    Ok(Json(ChatResponse { answer, sources }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ImageQueryBody {
    #[validate(length(min = 1, message = "Image data must not be empty"))]
    pub image_data: String,
    #[validate(length(min = 1, message = "Query must not be empty"))]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ImageQueryResponse {
    pub answer: String,
}

pub async fn analyze_image(
    State(state): State<AppState>,
    Json(body): Json<ImageQueryBody>,
) -> FluxoraResult<Json<ImageQueryResponse>> {
    validate_model(&body)?;
    let answer = state
        .chat
        .analyze_image_with_query(&body.image_data, &body.query)
        .await;
    Ok(Json(ImageQueryResponse { answer }))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> FluxoraResult<Json<DocumentSummary>> {
    state
        .documents
        .read()
        .await
        .get(&document_id)
        .map(|document| Json(document.summary()))
        .ok_or_else(|| FluxoraError::not_found(format!("Document {}", document_id)))
}

/// Forget a session and the documents uploaded into it. Indexed chunks stay
/// in the vector store.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> FluxoraResult<StatusCode> {
    let session = state
        .sessions
        .write()
        .await
        .remove(&session_id)
        .ok_or_else(|| FluxoraError::not_found(format!("Session {}", session_id)))?;

    let mut documents = state.documents.write().await;
    for document_id in &session.document_ids {
        documents.remove(document_id);
    }
    info!(session_id = %session_id, documents = session.document_ids.len(), "Deleted chat session");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> FluxoraResult<StatusCode> {
    state
        .documents
        .write()
        .await
        .remove(&document_id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| FluxoraError::not_found(format!("Document {}", document_id)))
}

async fn ensure_session(state: &AppState, session_id: Uuid) -> FluxoraResult<()> {
    if state.sessions.read().await.contains_key(&session_id) {
        Ok(())
    } else {
        Err(FluxoraError::not_found(format!("Session {}", session_id)))
    }
}
