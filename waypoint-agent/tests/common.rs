//! Shared doubles for the plan pipeline tests: a scripted browser session
//! with per-primitive call recording and a scripted generator.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, OnceLock};
use waypoint_common::{Result, WaypointError};
use waypoint_drivers::waypoint_browser::BrowserSession;
use waypoint_llm::traits::{LlmClient, LlmResponse};

static TRACING: OnceLock<()> = OnceLock::new();

pub fn init_test_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Browser double: records every call, answers extractions from a canned
/// selector -> data table.
#[derive(Default)]
pub struct ScriptedSession {
    pub start_calls: usize,
    pub close_calls: usize,
    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub fills: Vec<(String, String)>,
    pub scrolls: Vec<i64>,
    pub extract_calls: Vec<(String, String, Option<usize>)>,
    pub page_data: HashMap<String, Vec<String>>,
}

impl ScriptedSession {
    pub fn with_page_data(data: &[(&str, &[&str])]) -> Self {
        Self {
            page_data: data
                .iter()
                .map(|(selector, values)| {
                    (
                        selector.to_string(),
                        values.iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn primitive_calls(&self) -> usize {
        self.navigations.len()
            + self.clicks.len()
            + self.fills.len()
            + self.scrolls.len()
            + self.extract_calls.len()
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn start(&mut self) {
        self.start_calls += 1;
    }

    async fn close(&mut self) {
        self.close_calls += 1;
    }

    async fn navigate(&mut self, url: &str) -> bool {
        self.navigations.push(url.to_string());
        true
    }

    async fn click_element(&mut self, selector: &str) -> bool {
        self.clicks.push(selector.to_string());
        true
    }

    async fn fill_form(&mut self, selector: &str, text: &str) -> bool {
        self.fills.push((selector.to_string(), text.to_string()));
        true
    }

    async fn extract_data(
        &mut self,
        selector: &str,
        attribute: &str,
        limit: Option<usize>,
    ) -> Vec<String> {
        self.extract_calls
            .push((selector.to_string(), attribute.to_string(), limit));
        let mut data = self.page_data.get(selector).cloned().unwrap_or_default();
        if let Some(cap) = limit {
            data.truncate(cap);
        }
        data
    }

    async fn scroll_page(&mut self, y_pixels: i64) -> bool {
        self.scrolls.push(y_pixels);
        true
    }
}

pub enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Generator double: hands out queued replies and records the system
/// prompt of every call.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<ScriptedReply>>,
    pub seen_system_prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn replying(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen_system_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(text: &str) -> Self {
        Self::replying(vec![ScriptedReply::Text(text.to_string())])
    }

    pub fn failing(description: &str) -> Self {
        Self::replying(vec![ScriptedReply::Failure(description.to_string())])
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        _prompt: &str,
        system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
        _temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.seen_system_prompts
            .lock()
            .unwrap()
            .push(system_prompt.unwrap_or_default().to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptedReply::Text(String::new()));
        match reply {
            ScriptedReply::Text(text) => Ok(LlmResponse {
                text,
                model: Some("scripted".to_string()),
                tokens_used: None,
            }),
            ScriptedReply::Failure(description) => Err(WaypointError::Generator(description)),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
