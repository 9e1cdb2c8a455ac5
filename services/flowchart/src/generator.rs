use fluxora_llm::{prompts, ChatModel, ChatRequest, ModelTier, PromptLibrary};
use fluxora_models::Flowchart;
use fluxora_utils::{FluxoraError, FluxoraResult};
use std::sync::Arc;
use tracing::{info, warn};

const GENERATION_TEMPERATURE: f32 = 0.3;
const TROUBLESHOOT_TEMPERATURE: f32 = 0.7;

/// Error text passed to the troubleshooter when a user asks for help directly
pub const USER_REQUESTED_HELP: &str = "User requested help";

#[derive(Clone)]
pub struct FlowchartGenerator {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptLibrary>,
}

impl FlowchartGenerator {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptLibrary>) -> Self {
        Self { model, prompts }
    }

    /// Mermaid source for a process description, markdown fences removed.
    pub async fn generate_mermaid(&self, description: &str) -> FluxoraResult<String> {
        let request = ChatRequest::new(ModelTier::Chat, GENERATION_TEMPERATURE)
            .system(prompts::FLOWCHART_SYSTEM)
            .user(self.prompts.flowchart(description)?);

        let response = self.model.complete(request).await?;
        let mermaid = strip_code_fences(&response);
        if mermaid.is_empty() {
            return Err(FluxoraError::llm("Generated flowchart code was empty."));
        }

        info!(lines = mermaid.lines().count(), "Generated Mermaid flowchart");
        Ok(mermaid)
    }

    pub async fn generate(&self, description: &str) -> FluxoraResult<Flowchart> {
        let mermaid = self.generate_mermaid(description).await?;
        Ok(Flowchart {
            html: render_html(&mermaid),
            mermaid,
        })
    }

    /// Suggestions for a failed or unsatisfying generation. Never fails.
    pub async fn troubleshoot(&self, error: &str, description: &str) -> String {
        let request = self.prompts.troubleshoot(error, description).map(|prompt| {
            ChatRequest::new(ModelTier::Chat, TROUBLESHOOT_TEMPERATURE)
                .system(prompts::TROUBLESHOOT_SYSTEM)
                .user(prompt)
        });

        let result = match request {
            Ok(request) => self.model.complete(request).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, "Troubleshooting failed");
            format!("Troubleshooting also failed: {}", e)
        })
    }
}

/// Trim, then drop a leading ```/```mermaid line and a trailing ``` line.
pub fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.first().map_or(false, |l| l.trim().starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().map_or(false, |l| l.trim() == "```") {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Standalone page rendering the diagram with mermaid 10.
pub fn render_html(mermaid: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
    <script>
        mermaid.initialize({{
            startOnLoad: true,
            theme: 'default',
            securityLevel: 'loose',
            flowchart: {{
                useMaxWidth: true,
                htmlLabels: true,
                curve: 'basis'
            }}
        }});
    </script>
    <style>
        .mermaid {{
            text-align: center;
            margin: 20px 0;
        }}
    </style>
</head>
<body>
    <div class="mermaid">
{}
    </div>
</body>
</html>
"#,
        escape_html(mermaid)
    )
}

// mermaid reads the div's text content, so entities come back decoded
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxora_llm::testing::ScriptedChatModel;
    use proptest::prelude::*;

    const CHART: &str = "flowchart TD\n    A[Start] --> B{Valid?}\n    B -->|yes| C[Dashboard]";

    fn generator(model: Arc<ScriptedChatModel>) -> FlowchartGenerator {
        FlowchartGenerator::new(model, Arc::new(PromptLibrary::new().unwrap()))
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences(&format!("```mermaid\n{}\n```", CHART)), CHART);
        assert_eq!(strip_code_fences(&format!("```\n{}\n```\n", CHART)), CHART);
        assert_eq!(strip_code_fences(&format!("  {}  ", CHART)), CHART);
        assert_eq!(strip_code_fences("```\n```"), "");
    }

    #[test]
    fn test_render_html() {
        let html = render_html(CHART);
        assert!(html.contains("mermaid@10/dist/mermaid.min.js"));
        assert!(html.contains("securityLevel: 'loose'"));
        assert!(html.contains("curve: 'basis'"));
        assert!(html.contains("A[Start] --&gt; B{Valid?}"));
    }

    #[tokio::test]
    async fn test_generate_uses_chat_model() {
        let model = Arc::new(ScriptedChatModel::always(format!("```mermaid\n{}\n```", CHART)));
        let flowchart = generator(model.clone())
            .generate("User logs in, system validates")
            .await
            .unwrap();
        assert_eq!(flowchart.mermaid, CHART);

        let request = &model.requests()[0];
        assert_eq!(request.tier, ModelTier::Chat);
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.system.as_deref(), Some(prompts::FLOWCHART_SYSTEM));
        assert!(request.prompt_text().contains("User logs in, system validates"));
    }

    #[tokio::test]
    async fn test_empty_chart_is_error() {
        let err = generator(Arc::new(ScriptedChatModel::always("```\n```")))
            .generate_mermaid("x")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_troubleshoot_failure_text() {
        let help = generator(Arc::new(ScriptedChatModel::failing("offline")))
            .troubleshoot("boom", "process")
            .await;
        assert!(help.starts_with("Troubleshooting also failed:"));
        assert!(help.contains("offline"));
    }

    proptest! {
        #[test]
        fn prop_unfenced_text_is_only_trimmed(body in "[a-zA-Z0-9 >\\-\\[\\]\n]{0,80}") {
            prop_assume!(!body.trim().starts_with("```"));
            prop_assert_eq!(strip_code_fences(&body), body.trim());
        }
    }
}
