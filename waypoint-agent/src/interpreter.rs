//! Walks a [`Plan`] and drives the browser session.
//!
//! The step loop never aborts on a step outcome: primitives report
//! failures through their return values and the loop simply moves on. The
//! session is started once before the first step and closed exactly once
//! after the last, whatever happened in between.

use crate::plan::{Plan, Step};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{error, info, warn};
use waypoint_common::{Result, WaypointError};
use waypoint_drivers::waypoint_browser::BrowserSession;

/// Insertion-ordered mapping from result key to extracted strings.
///
/// Frozen once plan execution finishes; serialises to a JSON object whose
/// keys appear in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ResultMap {
    pub fn insert(&mut self, key: String, values: Vec<String>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// Execute every step of `plan` against `session`.
///
/// A plan without steps is refused up front ([`WaypointError::EmptyPlan`])
/// and the session stays untouched.
pub async fn execute_plan<S: BrowserSession>(session: &mut S, plan: &Plan) -> Result<ResultMap> {
    if plan.is_empty() {
        return Err(WaypointError::EmptyPlan);
    }

    info!(steps = plan.len(), "starting web automation");
    session.start().await;

    let mut results = ResultMap::default();
    for (index, step) in plan.steps.iter().enumerate() {
        info!(step = index + 1, action = step.action_name(), "dispatching");
        match step {
            Step::Navigate { url } => {
                session.navigate(url).await;
            }
            Step::Fill { selector, value } => {
                session.fill_form(selector, value).await;
            }
            Step::Click { selector } => {
                session.click_element(selector).await;
            }
            Step::Extract {
                selector,
                attribute,
                limit,
                result_key,
            } => {
                let data = session.extract_data(selector, attribute, *limit).await;
                let key = result_key
                    .clone()
                    .unwrap_or_else(|| format!("step_{index}_data"));
                info!(key = %key, items = data.len(), "stored extraction results");
                results.insert(key, data);
            }
            Step::Unknown { action } => {
                warn!(step = index + 1, %action, "unknown action, skipping");
            }
            Step::Malformed { action, missing } => {
                error!(step = index + 1, action, missing, "step is unusable, skipping");
            }
        }
    }

    session.close().await;
    Ok(results)
}
