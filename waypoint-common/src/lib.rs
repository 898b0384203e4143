//! Common types and utilities shared across Waypoint crates.
//!
//! This crate defines configuration, observability helpers, and shared error
//! types used throughout the Waypoint workspace. It is intentionally
//! lightweight so that every crate can depend on it without pulling heavy
//! transitive costs.
//!
//! # Overview
//!
//! - [`WaypointConfig`]: Top-level runtime configuration
//! - [`LlmConfig`]: Provider-agnostic generator configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`WaypointError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! Constructing a default configuration:
//!
//! ```rust
//! use waypoint_common::WaypointConfig;
//!
//! let cfg = WaypointConfig::default();
//! assert!(cfg.browser.headless);
//! assert_eq!(cfg.browser.port, 9515);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Configuration for the text-generation collaborator.
///
/// Feature flags control which variants are compiled in.
/// See the `waypoint-llm` crate for concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    #[cfg(feature = "ollama")]
    Ollama { base_url: String, model: String },
    #[cfg(feature = "openai")]
    OpenAi {
        api_key: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    None,
}

impl Default for LlmConfig {
    fn default() -> Self {
        // Default to Ollama if the feature is enabled
        #[cfg(feature = "ollama")]
        {
            Self::Ollama {
                base_url: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
            }
        }
        #[cfg(not(feature = "ollama"))]
        {
            Self::None
        }
    }
}

/// Browser session configuration.
///
/// When `webdriver_url` is set the session attaches to an already-running
/// WebDriver service and never spawns its own; otherwise a chromedriver
/// child is launched on `port`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Endpoint of an externally managed WebDriver service.
    pub webdriver_url: Option<String>,
    /// Executable used when spawning our own driver process.
    pub chromedriver_path: String,
    /// Port the spawned driver listens on.
    pub port: u16,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            webdriver_url: None,
            chromedriver_path: "chromedriver".to_string(),
            port: 9515,
        }
    }
}

/// Humanization delay bounds, in milliseconds.
///
/// Tests set all four fields to zero for deterministic runs; the defaults
/// mirror the pacing of a person skimming a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub action_min_ms: u64,
    pub action_max_ms: u64,
    pub keystroke_min_ms: u64,
    pub keystroke_max_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            action_min_ms: 500,
            action_max_ms: 1800,
            keystroke_min_ms: 50,
            keystroke_max_ms: 150,
        }
    }
}

/// Configuration for Waypoint runs.
///
/// This structure is passed to the orchestrator and session entrypoints to
/// configure runtime behavior. `waypoint-config` materialises it from
/// `waypoint.yaml` plus `WAYPOINT_`-prefixed environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    pub browser: BrowserConfig,
    pub delays: DelayConfig,
    pub llm: LlmConfig,
}

/// Error types used across the Waypoint system.
#[derive(thiserror::Error, Debug)]
pub enum WaypointError {
    /// The text-generation collaborator failed to produce an answer.
    #[error("Generator error: {0}")]
    Generator(String),

    /// The browser driver reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A plan with no steps was handed to the interpreter.
    #[error("Execution failed: No valid plan to execute.")]
    EmptyPlan,
}

/// Convenient alias for results that use [`WaypointError`].
pub type Result<T> = std::result::Result<T, WaypointError>;
