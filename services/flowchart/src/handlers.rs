use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use fluxora_models::{Flowchart, EXAMPLE_PROCESSES};
use fluxora_utils::{validate_model, ErrorResponse, FluxoraResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use validator::Validate;

use crate::generator::{render_html, USER_REQUESTED_HELP};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct DescriptionBody {
    #[validate(length(min = 1, message = "Please describe your process"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenderBody {
    #[validate(length(min = 1, message = "Mermaid code must not be empty"))]
    pub mermaid: String,
}

#[derive(Debug, Serialize)]
pub struct HelpResponse {
    pub troubleshooting: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct ExampleProcess {
    pub name: &'static str,
    pub description: &'static str,
}

/// Generation failed upstream; the body carries troubleshooting advice.
pub struct GenerationFailure {
    error: ErrorResponse,
    troubleshooting: String,
}

impl IntoResponse for GenerationFailure {
    fn into_response(self) -> Response {
        let mut body = self.error;
        body.details = Some(json!({ "troubleshooting": self.troubleshooting }));
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

pub async fn generate_flowchart(
    State(state): State<AppState>,
    Json(body): Json<DescriptionBody>,
) -> Result<Json<Flowchart>, Response> {
    validate_model(&body).map_err(IntoResponse::into_response)?;
    let description = body.description.trim();

    match state.generator.generate(description).await {
        Ok(flowchart) => Ok(Json(flowchart)),
        Err(e) => {
            warn!(error = %e, "Flowchart generation failed, troubleshooting");
            let troubleshooting = state
                .generator
                .troubleshoot(&format!("Error generating Mermaid code: {}", e), description)
                .await;
            Err(GenerationFailure {
                error: ErrorResponse::from(e),
                troubleshooting,
            }
            .into_response())
        }
    }
}

pub async fn help(
    State(state): State<AppState>,
    Json(body): Json<DescriptionBody>,
) -> FluxoraResult<Json<HelpResponse>> {
    validate_model(&body)?;
    let troubleshooting = state
        .generator
        .troubleshoot(USER_REQUESTED_HELP, body.description.trim())
        .await;
    Ok(Json(HelpResponse { troubleshooting }))
}

pub async fn render(Json(body): Json<RenderBody>) -> FluxoraResult<Json<RenderResponse>> {
    validate_model(&body)?;
    Ok(Json(RenderResponse {
        html: render_html(&body.mermaid),
    }))
}

pub async fn list_examples() -> Json<Vec<ExampleProcess>> {
    Json(
        EXAMPLE_PROCESSES
            .iter()
            .map(|&(name, description)| ExampleProcess { name, description })
            .collect(),
    )
}
