mod common;

use common::{init_test_tracing, ScriptedSession};
use waypoint_agent::{execute_plan, parse_plan, Plan};

fn plan_from(raw: &str) -> Plan {
    let plan = parse_plan(raw);
    assert!(!plan.is_empty(), "test plan should parse to steps: {raw}");
    plan
}

#[tokio::test]
async fn empty_plan_is_refused_without_touching_the_session() {
    init_test_tracing();
    let mut session = ScriptedSession::default();

    let err = execute_plan(&mut session, &parse_plan("no json at all"))
        .await
        .expect_err("an empty plan must not execute");

    assert_eq!(err.to_string(), "Execution failed: No valid plan to execute.");
    assert_eq!(session.start_calls, 0);
    assert_eq!(session.close_calls, 0);
    assert_eq!(session.primitive_calls(), 0);
}

#[tokio::test]
async fn session_is_started_and_closed_exactly_once() {
    init_test_tracing();
    let mut session = ScriptedSession::default();
    let plan = plan_from(r#"{"steps": [{"action": "navigate", "url": "https://example.test"}]}"#);

    execute_plan(&mut session, &plan).await.expect("plan executes");

    assert_eq!(session.start_calls, 1);
    assert_eq!(session.close_calls, 1);
    assert_eq!(session.navigations, vec!["https://example.test".to_string()]);
}

#[tokio::test]
async fn navigate_then_extract_yields_keyed_results() {
    // Scenario: a page whose only h1 is "Hello".
    init_test_tracing();
    let mut session = ScriptedSession::with_page_data(&[("h1", &["Hello"])]);
    let plan = plan_from(
        r#"{"steps": [
            {"action": "navigate", "url": "https://example.test"},
            {"action": "extract", "selector": "h1", "result_key": "title"}
        ]}"#,
    );

    let results = execute_plan(&mut session, &plan).await.expect("plan executes");

    assert_eq!(results.get("title"), Some(&["Hello".to_string()][..]));
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn unmatched_extract_keeps_its_key_with_no_values() {
    init_test_tracing();
    let mut session = ScriptedSession::default();
    let plan = plan_from(
        r#"{"steps": [{"action": "extract", "selector": ".nothing", "result_key": "missing"}]}"#,
    );

    let results = execute_plan(&mut session, &plan).await.expect("plan executes");

    let missing = results.get("missing").expect("the key must still be present");
    assert!(missing.is_empty());
}

#[tokio::test]
async fn extract_without_result_key_uses_its_position() {
    init_test_tracing();
    let mut session = ScriptedSession::with_page_data(&[("li", &["a", "b"])]);
    let plan = plan_from(
        r#"{"steps": [
            {"action": "navigate", "url": "https://example.test"},
            {"action": "click", "element": "#more"},
            {"action": "extract", "selector": "li"}
        ]}"#,
    );

    let results = execute_plan(&mut session, &plan).await.expect("plan executes");

    assert_eq!(
        results.get("step_2_data"),
        Some(&["a".to_string(), "b".to_string()][..])
    );
}

#[tokio::test]
async fn fill_aliases_behave_identically_and_absence_skips() {
    init_test_tracing();

    for alias in ["field", "selector"] {
        let mut session = ScriptedSession::default();
        let plan = plan_from(&format!(
            r#"{{"steps": [{{"action": "fill", "{alias}": "#q", "value": "cameras"}}]}}"#
        ));
        execute_plan(&mut session, &plan).await.expect("plan executes");
        assert_eq!(
            session.fills,
            vec![("#q".to_string(), "cameras".to_string())]
        );
    }

    // Neither alias present: the step is skipped, the input stays empty.
    let mut session = ScriptedSession::default();
    let plan = plan_from(r#"{"steps": [{"action": "fill", "value": "cameras"}]}"#);
    execute_plan(&mut session, &plan).await.expect("plan executes");
    assert!(session.fills.is_empty());
    assert_eq!(session.primitive_calls(), 0);
}

#[tokio::test]
async fn broken_steps_are_skipped_but_later_steps_still_run() {
    init_test_tracing();
    let mut session = ScriptedSession::with_page_data(&[("h2", &["after"])]);
    let plan = plan_from(
        r#"{"steps": [
            {"action": "navigate"},
            {"action": "sort", "by": "price"},
            {"action": "extract", "target": "h2", "result_key": "later"}
        ]}"#,
    );

    let results = execute_plan(&mut session, &plan).await.expect("plan executes");

    assert!(session.navigations.is_empty());
    assert_eq!(results.get("later"), Some(&["after".to_string()][..]));
    // Only the extract reached the session.
    assert_eq!(session.primitive_calls(), 1);
    assert_eq!(session.close_calls, 1);
}

#[tokio::test]
async fn extract_limit_is_passed_through_and_applied() {
    init_test_tracing();
    let mut session = ScriptedSession::with_page_data(&[("a.result", &["one", "two", "three"])]);
    let plan = plan_from(
        r#"{"steps": [
            {"action": "extract", "target": "a.result", "limit": 2, "result_key": "top"}
        ]}"#,
    );

    let results = execute_plan(&mut session, &plan).await.expect("plan executes");

    assert_eq!(session.extract_calls[0].2, Some(2));
    assert_eq!(
        results.get("top"),
        Some(&["one".to_string(), "two".to_string()][..])
    );
}
