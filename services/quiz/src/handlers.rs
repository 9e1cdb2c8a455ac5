use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use fluxora_models::{QuizAnswers, QuizQuestionView, QuizResult};
use fluxora_utils::{validate_model, FluxoraError, FluxoraResult, UploadForm};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{grade, AppState, QuizDocument};

#[derive(Debug, Serialize)]
pub struct DocumentTopicsResponse {
    pub document_id: Uuid,
    pub filename: String,
    pub elements: usize,
    pub topics: Vec<String>,
    pub message: String,
}

pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> FluxoraResult<(StatusCode, Json<DocumentTopicsResponse>)> {
    let file = UploadForm::read(multipart).await?.single_file()?;

    let document = state
        .processor
        .process_document(&file.filename, &file.data)
        .await?;
    let topics = state.generator.extract_topics(&document.elements).await;

    let response = DocumentTopicsResponse {
        document_id: document.id,
        filename: document.filename.clone(),
        elements: document.elements.len(),
        message: format!("PDF processed successfully! Found {} topics.", topics.len()),
        topics: topics.clone(),
    };
    info!(document_id = %document.id, topics = topics.len(), "Extracted quiz topics");

    let evicted = state
        .documents
        .write()
        .await
        .insert(document.id, QuizDocument { document, topics });
    if let Some(evicted) = evicted {
        info!(document_id = %evicted, "Evicted oldest quiz document");
    }

    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizBody {
    #[validate(length(min = 1, message = "Topic must not be empty"))]
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub quiz_id: Uuid,
    pub document_id: Uuid,
    pub topic: String,
    pub questions: Vec<QuizQuestionView>,
}

pub async fn create_quiz(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(body): Json<CreateQuizBody>,
) -> FluxoraResult<(StatusCode, Json<QuizResponse>)> {
    validate_model(&body)?;
    let topic = body.topic.trim();
    if topic.is_empty() {
        return Err(FluxoraError::validation("topic", "Topic must not be empty"));
    }

    let elements = state
        .documents
        .read()
        .await
        .get(&document_id)
        .map(|entry| entry.document.elements.clone())
        .ok_or_else(|| FluxoraError::not_found(format!("Document {}", document_id)))?;

    let quiz = state.generator.generate_quiz(document_id, topic, &elements).await;
    let response = QuizResponse {
        quiz_id: quiz.id,
        document_id,
        topic: quiz.topic.clone(),
        questions: quiz.view(),
    };
    state.quizzes.write().await.insert(quiz.id, quiz);

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> FluxoraResult<Json<QuizResponse>> {
    let quizzes = state.quizzes.read().await;
    let quiz = quizzes
        .get(&quiz_id)
        .ok_or_else(|| FluxoraError::not_found(format!("Quiz {}", quiz_id)))?;

    Ok(Json(QuizResponse {
        quiz_id: quiz.id,
        document_id: quiz.document_id,
        topic: quiz.topic.clone(),
        questions: quiz.view(),
    }))
}

/// Forget an uploaded document. Quizzes already generated from it remain.
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

pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> FluxoraResult<StatusCode> {
    state
        .quizzes
        .write()
        .await
        .remove(&quiz_id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| FluxoraError::not_found(format!("Quiz {}", quiz_id)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizBody {
    pub answers: QuizAnswers,
}

pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(body): Json<SubmitQuizBody>,
) -> FluxoraResult<Json<QuizResult>> {
    let quizzes = state.quizzes.read().await;
    let quiz = quizzes
        .get(&quiz_id)
        .ok_or_else(|| FluxoraError::not_found(format!("Quiz {}", quiz_id)))?;

    let result = grade(quiz, &body.answers)?;
    info!(quiz_id = %quiz_id, score = result.score, passed = result.passed, "Graded quiz");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{router, QuizGenerator};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, Router};
    use fluxora_documents::{ImageAnalyzer, Partitioner, PdfProcessor, RawElement};
    use fluxora_llm::testing::ScriptedChatModel;
    use fluxora_llm::PromptLibrary;
    use fluxora_utils::{AppConfig, SessionStoreConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedPartitioner;

    #[async_trait]
    impl Partitioner for FixedPartitioner {
        async fn partition(&self, _filename: &str, _data: &[u8]) -> FluxoraResult<Vec<RawElement>> {
            Ok(vec![
                RawElement::text("Title", "Plant Biology"),
                RawElement::text("NarrativeText", "Photosynthesis converts light into chemical energy."),
            ])
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn scripted_model() -> Arc<ScriptedChatModel> {
        Arc::new(ScriptedChatModel::new(|request| {
            let prompt = request.prompt_text();
            let reply = if prompt.contains("extract 5-7 main topics") {
                "1. Photosynthesis\n2. Plant Biology\n3. Chemical Energy"
            } else if prompt.contains("multiple choice") {
                "QUESTION: What does photosynthesis produce?\nA) Chemical energy\nB) Sound\nC) Heat only\nD) Nothing\nCORRECT: A\nREVIEW: Photosynthesis basics"
            } else if prompt.contains("true/false") {
                "QUESTION: Photosynthesis uses light.\nCORRECT: True"
            } else if prompt.contains("fill-in-the-blank") {
                "QUESTION: Photosynthesis converts ______ into energy.\nCORRECT: light"
            } else {
                "QUESTION: Describe photosynthesis.\nCORRECT: Plants convert light into chemical energy"
            };
            Ok(reply.to_string())
        }))
    }

    fn app() -> Router {
        app_with_limits(&AppConfig::default().sessions)
    }

    fn app_with_limits(limits: &SessionStoreConfig) -> Router {
        let model = scripted_model();
        let processor = PdfProcessor::new(
            Arc::new(FixedPartitioner),
            ImageAnalyzer::new(model.clone(), &AppConfig::default().image),
        );
        let generator = QuizGenerator::new(model, Arc::new(PromptLibrary::new().unwrap()));
        router(AppState::new(processor, generator, limits))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload(filename: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--quiz-boundary\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n--quiz-boundary--\r\n");

        Request::builder()
            .method("POST")
            .uri("/api/v1/quiz/documents")
            .header("content-type", "multipart/form-data; boundary=quiz-boundary")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_quiz_flow() {
        let app = app();

        let (status, json) = send(&app, upload("biology.pdf", b"%PDF-1.5 body")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["topics"], json!(["Photosynthesis", "Plant Biology", "Chemical Energy"]));
        assert_eq!(json["message"], "PDF processed successfully! Found 3 topics.");
        let document_id = json["document_id"].as_str().unwrap().to_string();

        let (status, quiz) = send(
            &app,
            post_json(
                &format!("/api/v1/quiz/documents/{}/quizzes", document_id),
                json!({ "topic": "Photosynthesis" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let questions = quiz["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0]["type"], "multiple_choice");
        assert_eq!(questions[0]["options"].as_array().unwrap().len(), 4);
        assert!(questions[0].get("correct_answer").is_none());
        let quiz_id = quiz["quiz_id"].as_str().unwrap().to_string();

        let (status, fetched) = send(
            &app,
            Request::builder()
                .uri(format!("/api/v1/quiz/quizzes/{}", quiz_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["topic"], "Photosynthesis");

        let (status, result) = send(
            &app,
            post_json(
                &format!("/api/v1/quiz/quizzes/{}/submit", quiz_id),
                json!({ "answers": {
                    "0": "A",
                    "1": "A) Chemical energy",
                    "2": "true",
                    "3": "Light",
                    "4": "plants convert light into chemical energy"
                }}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["correct"], 5);
        assert_eq!(result["score"], 100.0);
        assert_eq!(result["passed"], true);
    }

    #[tokio::test]
    async fn test_submit_with_missing_answers() {
        let app = app();
        let (_, json) = send(&app, upload("biology.pdf", b"%PDF-1.5 body")).await;
        let document_id = json["document_id"].as_str().unwrap().to_string();
        let (_, quiz) = send(
            &app,
            post_json(
                &format!("/api/v1/quiz/documents/{}/quizzes", document_id),
                json!({ "topic": "Photosynthesis" }),
            ),
        )
        .await;
        let quiz_id = quiz["quiz_id"].as_str().unwrap().to_string();

        let (status, json) = send(
            &app,
            post_json(
                &format!("/api/v1/quiz/quizzes/{}/submit", quiz_id),
                json!({ "answers": { "0": "A" } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().contains("4 unanswered"));
    }

    #[tokio::test]
    async fn test_unknown_document_and_quiz() {
        let app = app();
        let (status, _) = send(
            &app,
            post_json(
                &format!("/api/v1/quiz/documents/{}/quizzes", Uuid::new_v4()),
                json!({ "topic": "Anything" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Request::builder()
                .uri(format!("/api/v1/quiz/quizzes/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_requires_pdf() {
        let (status, json) = send(&app(), upload("notes.txt", b"just text")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn create_quiz(app: &Router, document_id: &str) -> (StatusCode, Value) {
        send(
            app,
            post_json(
                &format!("/api/v1/quiz/documents/{}/quizzes", document_id),
                json!({ "topic": "Photosynthesis" }),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn test_delete_document_and_quiz() {
        let app = app();
        let (_, json) = send(&app, upload("biology.pdf", b"%PDF-1.5 body")).await;
        let document_id = json["document_id"].as_str().unwrap().to_string();
        let (_, quiz) = create_quiz(&app, &document_id).await;
        let quiz_uri = format!("/api/v1/quiz/quizzes/{}", quiz["quiz_id"].as_str().unwrap());

        let document_uri = format!("/api/v1/quiz/documents/{}", document_id);
        assert_eq!(send(&app, delete(&document_uri)).await.0, StatusCode::NO_CONTENT);
        assert_eq!(create_quiz(&app, &document_id).await.0, StatusCode::NOT_FOUND);
        assert_eq!(send(&app, delete(&document_uri)).await.0, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Request::builder().uri(&quiz_uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(send(&app, delete(&quiz_uri)).await.0, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Request::builder().uri(&quiz_uri).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_document_limit_evicts_oldest() {
        let app = app_with_limits(&SessionStoreConfig {
            max_entries: 1,
            ttl_seconds: 3600,
            sweep_interval_seconds: 60,
        });

        let (_, first) = send(&app, upload("first.pdf", b"%PDF-1.5 body")).await;
        let (_, second) = send(&app, upload("second.pdf", b"%PDF-1.5 body")).await;

        let (status, _) = create_quiz(&app, first["document_id"].as_str().unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = create_quiz(&app, second["document_id"].as_str().unwrap()).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}
