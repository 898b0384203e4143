use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use waypoint_common::Result;

/// One generator answer, plus whatever metadata the provider reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Contract with the text-generation collaborator.
///
/// Callers must tolerate `text` containing prose around any embedded JSON
/// payload, and must tolerate the call failing outright.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with an optional system prompt.
    ///
    /// The system prompt is scoped to this single call; clients hold no
    /// prompt state between calls.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the generator service is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Name of the model being used.
    fn model_name(&self) -> &str;
}
