use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use waypoint_common::{Result, WaypointError};

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a new client and verify server/model availability.
    pub async fn new(base_url: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WaypointError::Generator(format!("Failed to create HTTP client: {e}")))?;

        let ollama = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        };

        ollama.probe_server().await?;
        ollama.ensure_model_available().await?;

        Ok(ollama)
    }

    async fn probe_server(&self) -> Result<()> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|_| WaypointError::Generator(OLLAMA_CONNECTION_ERROR.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(WaypointError::Generator(OLLAMA_CONNECTION_ERROR.to_string()))
        }
    }

    async fn ensure_model_available(&self) -> Result<()> {
        if !self.installed_models().await?.contains(&self.model) {
            tracing::info!(model = %self.model, "model not found locally, pulling");
            self.pull_model().await?;
        }
        Ok(())
    }

    async fn installed_models(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| WaypointError::Generator(format!("Failed to fetch models: {e}")))?;

        if !resp.status().is_success() {
            return Ok(Vec::new());
        }

        let val: JsonValue = resp
            .json()
            .await
            .map_err(|e| WaypointError::Generator(format!("Failed to parse models response: {e}")))?;

        Ok(val
            .get("models")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m.get("name").and_then(JsonValue::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn pull_model(&self) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&json!({ "model": self.model, "stream": false }))
            .send()
            .await
            .map_err(|e| WaypointError::Generator(format!("Failed to pull model: {e}")))?;

        if resp.status().is_success() {
            tracing::info!(model = %self.model, "model pulled");
            Ok(())
        } else {
            Err(WaypointError::Generator(format!(
                "Failed to pull model: HTTP {}",
                resp.status()
            )))
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let mut options = serde_json::Map::new();
        if let Some(temp) = temperature {
            options.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tok) = max_tokens {
            options.insert("num_predict".to_string(), json!(max_tok));
        }

        let mut payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": options
        });
        if let Some(system) = system_prompt {
            payload["system"] = json!(system);
        }

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| WaypointError::Generator(format!("Generate request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(WaypointError::Generator(format!(
                "Generate failed: HTTP {}",
                resp.status()
            )));
        }

        let val: JsonValue = resp
            .json()
            .await
            .map_err(|e| WaypointError::Generator(format!("Failed to parse response: {e}")))?;

        let text = val
            .get("response")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        let tokens_used = val
            .get("eval_count")
            .and_then(JsonValue::as_u64)
            .map(|c| c as u32);

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        self.probe_server().await.map(|_| true).or(Ok(false))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
