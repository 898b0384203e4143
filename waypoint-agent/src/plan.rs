//! The plan model: an ordered list of typed browser actions.
//!
//! Generators emit loosely-shaped JSON; conversion into [`Step`] happens
//! with defensive field lookups so that a single sloppy step degrades to a
//! skippable marker instead of poisoning the whole plan. Steps are
//! immutable once parsed and keep their position, which positional result
//! keys depend on.

use serde_json::Value;

/// One planned browser action.
///
/// `Unknown` and `Malformed` are flagged during conversion and skipped by
/// the interpreter; they stay in the sequence so later steps keep their
/// indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Navigate {
        url: String,
    },
    Fill {
        selector: String,
        value: String,
    },
    Click {
        selector: String,
    },
    Extract {
        selector: String,
        attribute: String,
        limit: Option<usize>,
        result_key: Option<String>,
    },
    /// Action tag nobody recognises.
    Unknown { action: String },
    /// Recognised action missing the field it cannot run without.
    Malformed {
        action: &'static str,
        missing: &'static str,
    },
}

impl Step {
    /// Convert one raw plan entry, tolerating missing and aliased fields.
    ///
    /// Selector aliases per action: `fill` reads `field`, `click` reads
    /// `element`, `extract` reads `target`, each falling back to
    /// `selector`.
    pub fn from_value(raw: &Value) -> Step {
        let action = raw.get("action").and_then(Value::as_str).unwrap_or_default();
        match action {
            "navigate" => match string_field(raw, &["url"]) {
                Some(url) => Step::Navigate { url },
                None => Step::Malformed {
                    action: "navigate",
                    missing: "url",
                },
            },
            "fill" => match string_field(raw, &["field", "selector"]) {
                Some(selector) => Step::Fill {
                    selector,
                    value: string_field(raw, &["value"]).unwrap_or_default(),
                },
                None => Step::Malformed {
                    action: "fill",
                    missing: "selector",
                },
            },
            "click" => match string_field(raw, &["element", "selector"]) {
                Some(selector) => Step::Click { selector },
                None => Step::Malformed {
                    action: "click",
                    missing: "selector",
                },
            },
            "extract" => match string_field(raw, &["target", "selector"]) {
                Some(selector) => Step::Extract {
                    selector,
                    attribute: string_field(raw, &["attribute"])
                        .unwrap_or_else(|| "text".to_string()),
                    limit: raw
                        .get("limit")
                        .and_then(Value::as_u64)
                        .map(|n| n as usize),
                    result_key: string_field(raw, &["result_key"]),
                },
                None => Step::Malformed {
                    action: "extract",
                    missing: "selector",
                },
            },
            other => Step::Unknown {
                action: other.to_string(),
            },
        }
    }

    /// Tag used in log lines.
    pub fn action_name(&self) -> &str {
        match self {
            Step::Navigate { .. } => "navigate",
            Step::Fill { .. } => "fill",
            Step::Click { .. } => "click",
            Step::Extract { .. } => "extract",
            Step::Unknown { action } => action,
            Step::Malformed { action, .. } => action,
        }
    }
}

fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// An ordered sequence of steps under a single `steps` key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn navigate_requires_a_url() {
        let step = Step::from_value(&json!({ "action": "navigate", "url": "https://example.test" }));
        assert_eq!(
            step,
            Step::Navigate {
                url: "https://example.test".to_string()
            }
        );

        let step = Step::from_value(&json!({ "action": "navigate" }));
        assert_eq!(
            step,
            Step::Malformed {
                action: "navigate",
                missing: "url"
            }
        );
    }

    #[test]
    fn fill_accepts_either_alias_and_defaults_value() {
        let by_field = Step::from_value(&json!({ "action": "fill", "field": "#q", "value": "rust" }));
        let by_selector =
            Step::from_value(&json!({ "action": "fill", "selector": "#q", "value": "rust" }));
        assert_eq!(by_field, by_selector);

        let step = Step::from_value(&json!({ "action": "fill", "field": "#q" }));
        assert_eq!(
            step,
            Step::Fill {
                selector: "#q".to_string(),
                value: String::new()
            }
        );
    }

    #[test]
    fn click_falls_back_from_element_to_selector() {
        let step = Step::from_value(&json!({ "action": "click", "selector": "#go" }));
        assert_eq!(
            step,
            Step::Click {
                selector: "#go".to_string()
            }
        );
    }

    #[test]
    fn extract_carries_defaults_and_options() {
        let step = Step::from_value(&json!({ "action": "extract", "target": "h1" }));
        assert_eq!(
            step,
            Step::Extract {
                selector: "h1".to_string(),
                attribute: "text".to_string(),
                limit: None,
                result_key: None,
            }
        );

        let step = Step::from_value(&json!({
            "action": "extract",
            "selector": "a.result",
            "attribute": "href",
            "limit": 5,
            "result_key": "links"
        }));
        assert_eq!(
            step,
            Step::Extract {
                selector: "a.result".to_string(),
                attribute: "href".to_string(),
                limit: Some(5),
                result_key: Some("links".to_string()),
            }
        );
    }

    #[test]
    fn unrecognised_tags_are_flagged_not_dropped() {
        let step = Step::from_value(&json!({ "action": "sort", "by": "price" }));
        assert_eq!(
            step,
            Step::Unknown {
                action: "sort".to_string()
            }
        );

        // Entries that are not even objects degrade the same way.
        let step = Step::from_value(&json!("just a string"));
        assert_eq!(
            step,
            Step::Unknown {
                action: String::new()
            }
        );
    }

    #[test]
    fn blank_selectors_count_as_missing() {
        let step = Step::from_value(&json!({ "action": "click", "element": "   " }));
        assert_eq!(
            step,
            Step::Malformed {
                action: "click",
                missing: "selector"
            }
        );
    }
}
