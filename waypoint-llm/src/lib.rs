//! Provider-agnostic generator integration for Waypoint.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for Ollama and OpenAI-compatible endpoints,
//! plus a convenience function to initialise a client from a
//! [`waypoint_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use waypoint_common::{LlmConfig, Result};
//! use waypoint_llm::ensure_llm_ready;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let cfg = LlmConfig::default();
//! let client = ensure_llm_ready(&cfg).await?;
//! assert!(!client.model_name().is_empty());
//! # Ok(())
//! # }
//! ```
#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;
pub mod traits;

use std::sync::Arc;
use traits::LlmClient;
use waypoint_common::{LlmConfig, WaypointError};

/// Ensure a generator client is ready (downloading models if needed).
pub async fn ensure_llm_ready(
    config: &LlmConfig,
) -> waypoint_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        #[cfg(feature = "ollama")]
        LlmConfig::Ollama { base_url, model } => {
            let client = ollama::OllamaClient::new(base_url.clone(), model.clone()).await?;
            Ok(Arc::new(client))
        }
        #[cfg(feature = "openai")]
        LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => {
            let client =
                openai::OpenAiClient::new(api_key.clone(), model.clone(), base_url.clone())?;
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(WaypointError::Config("No generator configured".to_string())),
        #[allow(unreachable_patterns)]
        _ => Err(WaypointError::Config(
            "Generator provider not enabled".to_string(),
        )),
    }
}
