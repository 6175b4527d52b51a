pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod response;

pub use llm::{ChatCompletion, ChatRequest, LlmError, OpenAiClient};
pub use models::{DisplayDocument, IdeaDocument, InsightDocument};
pub use pipeline::{format_for_display, InsightPipeline};

/// Model parameters for both stages.
///
/// Extraction runs cold for consistency; idea generation runs warmer for variety.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub extraction_model: String,
    pub extraction_temperature: f32,
    pub extraction_max_tokens: u32,
    pub ideas_model: String,
    pub ideas_temperature: f32,
    pub ideas_max_tokens: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            extraction_model: "gpt-3.5-turbo-16k".to_string(),
            extraction_temperature: 0.3,
            extraction_max_tokens: 4000,
            ideas_model: "gpt-3.5-turbo".to_string(),
            ideas_temperature: 0.7,
            ideas_max_tokens: 2000,
        }
    }
}
