//! Prompt templates for every LLM call the services make.
//!
//! Templates are rendered with handlebars with HTML escaping disabled, since
//! the output goes to a model and not a browser.

use fluxora_utils::{FluxoraError, FluxoraResult};
use handlebars::Handlebars;
use serde_json::json;

pub const CHAT_SYSTEM: &str = "You help users understand and analyze documents by answering questions based on the provided context.

When answering:
1. Use the provided context from the documents to answer questions accurately
2. If context includes images, refer to their descriptions when relevant
3. For tables, use the structured HTML content when available
4. Be concise but comprehensive in your responses
5. If you cannot find relevant information in the context, say so clearly
6. Always cite which part of the document you're referencing when possible
";

pub const IMAGE_ANALYSIS_SYSTEM: &str = "you are an image analyzing assistant, analyze all images with atmost accuracy to retrive all information from it.";

pub const IMAGE_ANALYSIS: &str = "Analyze this image and provide a detailed description. Include:
1. What the image shows (objects, people, scenes, etc.)
2. Any text visible in the image
3. Important details that might be relevant for document understanding
4. If it's a chart, graph, or table, describe the data it contains

Provide a comprehensive description that contains all the values, data and key findings from the image.
";

pub const IMAGE_QUERY_USER: &str = "Please analyze this image based on the question above.";

pub const FLOWCHART_SYSTEM: &str = "You are an expert at creating Mermaid flowchart diagrams.
You must respond with ONLY the Mermaid code - no explanations, no markdown formatting, no JSON, just the raw Mermaid syntax.";

pub const TROUBLESHOOT_SYSTEM: &str =
    "You are a helpful assistant that helps debug and improve Mermaid flowchart generation.";

const CHAT: &str = "{{#if history}}Previous conversation: \n{{history}}\n\n{{/if}}Based on the following context from the uploaded documents, please answer the user's question.

Context:
{{context}}

User Question: {{query}}

Please provide a comprehensive answer based on the context above. If the context includes information from images or tables, make sure to incorporate that information in your response.";

const IMAGE_QUERY: &str = "Please analyze this image and answer the following question: {{query}}

Provide a detailed response based on what you can see in the image.";

const TOPICS: &str = "Analyze the following document content and extract 5-7 main topics that could be used for quiz questions.

Content: {{content}}

Return only a numbered list of topics, each topic should be 2-5 words describing a key concept, subject, or theme.

Example format:
1. Data Structures
2. Algorithm Complexity
3. Memory Management
4. Network Protocols
5. Database Design

Topics:
";

const QUESTION_MULTIPLE_CHOICE: &str = "Based on the following content about \"{{topic}}\", create 1 multiple choice question.

Content: {{content}}

Create a question with 4 realistic options where only one is correct.

Respond in this exact format:
QUESTION: [Your question here]
A) [First option]
B) [Second option]
C) [Third option]
D) [Fourth option]
CORRECT: [A, B, C, or D]
EXPLANATION: [Why the answer is correct]
REVIEW: [What section to review if wrong]
";

const QUESTION_TRUE_FALSE: &str = "Based on the following content about \"{{topic}}\", create 1 true/false question.

Content: {{content}}

Create a statement that is either clearly true or clearly false based on the content.

Respond in this exact format:
QUESTION: [Your statement here]
CORRECT: [True or False]
EXPLANATION: [Why this is the correct answer]
REVIEW: [What section to review if wrong]
";

const QUESTION_FILL_BLANK: &str = "Based on the following content about \"{{topic}}\", create 1 fill-in-the-blank question.

Content: {{content}}

Create a sentence with one important word or phrase replaced with \"______\".

Respond in this exact format:
QUESTION: [Your sentence with ______ for the missing part]
CORRECT: [The word/phrase that goes in the blank]
EXPLANATION: [Why this is the correct answer]
REVIEW: [What section to review if wrong]
";

const QUESTION_SHORT_ANSWER: &str = "Based on the following content about \"{{topic}}\", create 1 short answer question.

Content: {{content}}

Create a question that requires a 1-2 sentence answer.

Respond in this exact format:
QUESTION: [Your question here]
CORRECT: [A good 1-2 sentence answer]
EXPLANATION: [Additional explanation]
REVIEW: [What section to review if wrong]
";

const LOCALIZATION_SYSTEM: &str = "You are an expert localization specialist fluent in {{language}} with deep knowledge of {{context}}. Provide culturally appropriate and linguistically accurate localization.";

const LOCALIZATION: &str = "You are an expert localization specialist. Please provide a comprehensive, culturally localized summary of this document.

TARGET LANGUAGE: {{language}}
CULTURAL CONTEXT: {{context}}
DETECTED DOCUMENT TYPE: {{doc_type}}

LOCALIZATION STRATEGY:
{{strategy}}

DOCUMENT CONTENT:
{{content}}

Please provide:
1. A comprehensive summary in {{language}}
2. Cultural context and relevance for {{context}}
3. Key points adapted for the target culture
4. Any important cultural considerations or differences
5. Practical implications for the target audience
6. Regional variations or adaptations needed

Make the summary detailed and culturally relevant while maintaining accuracy. If certain concepts don't translate well culturally, explain the differences and provide local equivalents or context.

Write the entire response in {{language}} unless specifically explaining cultural differences that require comparison.
";

const FLOWCHART: &str = "Create a flowchart in Mermaid format for this process:

{{description}}

Requirements:
- Start with \"flowchart TD\" or \"flowchart LR\"
- Use clear node IDs (A, B, C, etc.) with descriptive labels in brackets
- Use arrows --> to show flow
- Use curly braces for decision nodes: C{Decision?}
- Use |label| for arrow labels when needed

Return ONLY the Mermaid code, nothing else.";

const TROUBLESHOOT: &str = "I'm having trouble generating a Mermaid flowchart. Here's the error and context:

Original Process Description: {{description}}

Error: {{error}}

Please help by:
1. Suggesting what might be wrong
2. Providing a simple, working Mermaid flowchart example for the process
3. Give tips for better process descriptions

Respond in a helpful, conversational way.";

const STANDARD_SUMMARY: &str = "You are a helpful assistant. Read the text below and produce a concise summary according to the text given in bullet points. highlighting key facts, concepts, numbers, and decisions. Avoid fluff, keep it faithful to the source.

--- BEGIN TEXT ---
{{text}}
--- END TEXT ---";

const ENHANCED_SUMMARY: &str = "Analyze the following text and provide a comprehensive analysis:

{{text}}

Please provide:
1. A concise summary in bullet points highlighting key facts, concepts, numbers, and decisions
2. The 3 most important key points
3. Any notable insights or takeaways

Format your response as:
SUMMARY:
[bullet point summary here]

KEY POINTS:
1. [first key point]
2. [second key point]
3. [third key point]

INSIGHTS:
[insights and takeaways here]
";

const TEMPLATES: &[(&str, &str)] = &[
    ("chat", CHAT),
    ("image_query", IMAGE_QUERY),
    ("topics", TOPICS),
    ("question_multiple_choice", QUESTION_MULTIPLE_CHOICE),
    ("question_true_false", QUESTION_TRUE_FALSE),
    ("question_fill_blank", QUESTION_FILL_BLANK),
    ("question_short_answer", QUESTION_SHORT_ANSWER),
    ("localization_system", LOCALIZATION_SYSTEM),
    ("localization", LOCALIZATION),
    ("flowchart", FLOWCHART),
    ("troubleshoot", TROUBLESHOOT),
    ("standard_summary", STANDARD_SUMMARY),
    ("enhanced_summary", ENHANCED_SUMMARY),
];

pub struct PromptLibrary {
    handlebars: Handlebars<'static>,
}

impl PromptLibrary {
    pub fn new() -> FluxoraResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, template) in TEMPLATES {
            handlebars
                .register_template_string(name, *template)
                .map_err(|e| FluxoraError::internal(format!("Prompt template '{}': {}", name, e)))?;
        }

        Ok(Self { handlebars })
    }

    fn render(&self, name: &str, data: serde_json::Value) -> FluxoraResult<String> {
        self.handlebars
            .render(name, &data)
            .map_err(|e| FluxoraError::internal(format!("Failed to render prompt '{}': {}", name, e)))
    }

    /// `history` is the already formatted `role: content` transcript, empty for none.
    pub fn chat(&self, context: &str, query: &str, history: &str) -> FluxoraResult<String> {
        self.render(
            "chat",
            json!({ "context": context, "query": query, "history": history }),
        )
    }

    pub fn image_query(&self, query: &str) -> FluxoraResult<String> {
        self.render("image_query", json!({ "query": query }))
    }

    pub fn topics(&self, content: &str) -> FluxoraResult<String> {
        self.render("topics", json!({ "content": content }))
    }

    /// `question_type` is the snake_case question type name.
    pub fn question(&self, question_type: &str, topic: &str, content: &str) -> FluxoraResult<String> {
        let name = format!("question_{}", question_type);
        if !self.handlebars.has_template(&name) {
            return Err(FluxoraError::validation(
                "question_type",
                format!("Unknown question type '{}'", question_type),
            ));
        }
        self.render(&name, json!({ "topic": topic, "content": content }))
    }

    pub fn localization_system(&self, language: &str, context: &str) -> FluxoraResult<String> {
        self.render(
            "localization_system",
            json!({ "language": language, "context": context }),
        )
    }

    pub fn localization(
        &self,
        language: &str,
        context: &str,
        doc_type: &str,
        strategy: &str,
        content: &str,
    ) -> FluxoraResult<String> {
        self.render(
            "localization",
            json!({
                "language": language,
                "context": context,
                "doc_type": doc_type,
                "strategy": strategy,
                "content": content,
            }),
        )
    }

    pub fn flowchart(&self, description: &str) -> FluxoraResult<String> {
        self.render("flowchart", json!({ "description": description }))
    }

    pub fn troubleshoot(&self, error: &str, description: &str) -> FluxoraResult<String> {
        self.render(
            "troubleshoot",
            json!({ "error": error, "description": description }),
        )
    }

    pub fn standard_summary(&self, text: &str) -> FluxoraResult<String> {
        self.render("standard_summary", json!({ "text": text }))
    }

    pub fn enhanced_summary(&self, text: &str) -> FluxoraResult<String> {
        self.render("enhanced_summary", json!({ "text": text }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> PromptLibrary {
        PromptLibrary::new().unwrap()
    }

    #[test]
    fn test_chat_prompt_without_history() {
        let prompt = library()
            .chat("Document 1 (source: a.pdf):\nContent: x\n", "What is x?", "")
            .unwrap();
        assert!(prompt.starts_with("Based on the following context"));
        assert!(prompt.contains("User Question: What is x?"));
        assert!(!prompt.contains("Previous conversation"));
    }

    #[test]
    fn test_chat_prompt_with_history() {
        let prompt = library()
            .chat("ctx", "follow up", "user: hi\nassistant: hello")
            .unwrap();
        assert!(prompt.starts_with("Previous conversation: \nuser: hi\nassistant: hello\n\nBased on"));
    }

    #[test]
    fn test_no_html_escaping() {
        let prompt = library()
            .chat("<table><tr><td>A & B</td></tr></table>", "\"quoted\"", "")
            .unwrap();
        assert!(prompt.contains("<table><tr><td>A & B</td></tr></table>"));
        assert!(prompt.contains("\"quoted\""));
    }

    #[test]
    fn test_question_prompts() {
        let library = library();
        for question_type in ["multiple_choice", "true_false", "fill_blank", "short_answer"] {
            let prompt = library.question(question_type, "Memory", "content").unwrap();
            assert!(prompt.contains("about \"Memory\""));
            assert!(prompt.contains("QUESTION:"));
            assert!(prompt.contains("REVIEW:"));
        }
        assert!(library.question("essay", "Memory", "content").is_err());
    }

    #[test]
    fn test_flowchart_prompt_keeps_braces() {
        let prompt = library().flowchart("Order then ship").unwrap();
        assert!(prompt.contains("C{Decision?}"));
        assert!(prompt.contains("Order then ship"));
    }

    #[test]
    fn test_localization_prompts() {
        let library = library();
        let system = library.localization_system("Hindi", "India - General").unwrap();
        assert!(system.contains("fluent in Hindi with deep knowledge of India - General"));

        let prompt = library
            .localization("Hindi", "India - General", "Business", "Focus on:\n- x", "Text Section:\nhi")
            .unwrap();
        assert!(prompt.contains("DETECTED DOCUMENT TYPE: Business"));
        assert!(prompt.contains("Write the entire response in Hindi"));
    }

    #[test]
    fn test_summary_prompts() {
        let library = library();
        let standard = library.standard_summary("some text").unwrap();
        assert!(standard.ends_with("--- BEGIN TEXT ---\nsome text\n--- END TEXT ---"));
        let enhanced = library.enhanced_summary("some text").unwrap();
        assert!(enhanced.contains("KEY POINTS:"));
    }
}
