//! Recovers a [`Plan`] from unstructured generator output.
//!
//! Generators wrap their JSON in prose, markdown fences, or apologies. The
//! parser cuts the span from the first `{` to the last `}` and decodes
//! that; anything unusable degrades to an empty plan with a warning, never
//! an error.

use crate::plan::{Plan, Step};
use serde_json::Value;
use tracing::warn;

/// Parse generator text into a plan. Soft-fails to an empty plan.
pub fn parse_plan(raw: &str) -> Plan {
    let Some(span) = json_span(raw) else {
        warn!("no JSON object found in generator output");
        return Plan::default();
    };

    let value: Value = match serde_json::from_str(span) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "generator output was not valid JSON");
            return Plan::default();
        }
    };

    let Some(steps) = value.get("steps").and_then(Value::as_array) else {
        warn!("generator JSON carried no steps list");
        return Plan::default();
    };

    Plan {
        steps: steps.iter().map(Step::from_value).collect(),
    }
}

/// The outermost `{...}` span, if the text contains one.
fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
