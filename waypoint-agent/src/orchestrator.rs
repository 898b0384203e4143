//! The orchestrator: instruction in, rendered result map out.
//!
//! [`Navigator`] glues the external text generator to the plan pipeline.
//! The planning system prompt is scoped to each planning call, so a
//! failed call can never leak planner state into later questions.

use crate::history::TaskHistory;
use crate::interpreter::execute_plan;
use crate::parser::parse_plan;
use crate::plan::Plan;
use std::sync::Arc;
use tracing::{info, warn};
use waypoint_drivers::waypoint_browser::BrowserSession;
use waypoint_llm::traits::LlmClient;

/// System prompt for the planning call.
pub const PLANNER_SYSTEM_PROMPT: &str = "You are an AI planner. Read the user instruction carefully and return a clear step-by-step plan in JSON format. \
The JSON MUST have a single key 'steps', which is a list of action objects. \
Supported actions are 'navigate', 'fill', 'click', and 'extract'. \
IMPORTANT: Output ONLY valid JSON, no explanations, no code fences.";

/// System prompt for plain question answering.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an AI assistant. Answer clearly and concisely.";

/// Connects the generator's plan to the browser session, enabling
/// multi-step tasks from a single instruction.
pub struct Navigator<S> {
    llm: Arc<dyn LlmClient>,
    session: S,
    system_prompt: String,
    history: TaskHistory,
}

impl<S: BrowserSession> Navigator<S> {
    pub fn new(llm: Arc<dyn LlmClient>, session: S) -> Self {
        Self {
            llm,
            session,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history: TaskHistory::default(),
        }
    }

    /// Ask the generator a plain question under the default system prompt.
    pub async fn ask(&self, question: &str) -> String {
        self.request(&self.system_prompt, question, None).await
    }

    /// Convert an instruction into a structured plan.
    ///
    /// A generator failure becomes an `Error: ...` answer, which fails to
    /// parse and so degrades to an empty plan.
    pub async fn generate_plan(&self, instruction: &str) -> Plan {
        let question = format!(
            "INSTRUCTION:\n{instruction}\n\nGenerate the plan as a JSON object with a single top-level key 'steps'."
        );
        let answer = self
            .request(PLANNER_SYSTEM_PROMPT, &question, Some(0.0))
            .await;
        parse_plan(&answer)
    }

    /// Main entry point: plan, execute, record, return the rendered result.
    pub async fn run(&mut self, instruction: &str) -> String {
        info!(%instruction, "received instruction");

        let plan = self.generate_plan(instruction).await;
        info!(steps = plan.len(), "plan generated");

        let rendered = match execute_plan(&mut self.session, &plan).await {
            Ok(results) => results.to_json_pretty(),
            Err(e) => {
                warn!(error = %e, "plan was not executable");
                e.to_string()
            }
        };

        self.history.record(instruction, &rendered);
        rendered
    }

    pub fn history(&self) -> &TaskHistory {
        &self.history
    }

    /// The owned browser session, for inspection.
    pub fn session(&self) -> &S {
        &self.session
    }

    async fn request(&self, system_prompt: &str, question: &str, temperature: Option<f32>) -> String {
        match self
            .llm
            .generate(question, Some(system_prompt), None, temperature)
            .await
        {
            Ok(response) => response.text,
            Err(e) => format!("Error: {e}"),
        }
    }
}
