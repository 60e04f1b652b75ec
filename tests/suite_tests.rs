use contract_verifier::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_utils::*;

/// Suite Runner Tests - fan-out, ordering and report accounting

fn authors_list() -> JsonValue {
    json!([{"id": 1, "idBook": 1, "firstName": "First", "lastName": "Last"}])
}

#[tokio::test]
async fn test_suite_reports_in_case_order() {
    init_logging();
    let transport = Arc::new(
        MockTransport::new()
            .respond(json_response(200, authors_list()))
            .respond(empty_response(400))
            .respond(json_response(200, json!({}))),
    );
    let verifier = Arc::new(create_verifier(transport));
    let cases = vec![
        SuiteCase::new("authors", VerificationRequest::get("Authors")),
        SuiteCase::new(
            "bad delete",
            VerificationRequest::delete("Books", json!("invalid-id")).expecting(ScenarioClass::ValidationFailure),
        ),
        SuiteCase::new("empty author", VerificationRequest::get("Authors").with_id(json!(7))),
        SuiteCase::new("unknown", VerificationRequest::get("Magazines")),
    ];

    let report = SuiteRunner::new(verifier).with_max_concurrency(1).run(cases).await;

    let names: Vec<&str> = report.cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["authors", "bad delete", "empty author", "unknown"]);
    assert_eq!(report.total(), 4);
    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.errored(), 1);
    assert!(!report.is_success());
    assert!(matches!(report.cases[3].result, CaseResult::AuthoringError { .. }));

    let text = report.to_string();
    assert!(text.contains("unknown ... ERROR"));
    assert!(text.ends_with("4 cases: 2 passed, 1 failed, 1 authoring errors"));
}

#[tokio::test]
async fn test_suite_fans_out_concurrently() {
    let transport = Arc::new(
        MockTransport::new()
            .with_delay(Duration::from_millis(100))
            .always(json_response(200, authors_list())),
    );
    let verifier = Arc::new(create_verifier(transport.clone()));
    let cases = (0..3)
        .map(|i| SuiteCase::new(format!("concurrent #{}", i), VerificationRequest::get("Authors")))
        .collect();

    let started = Instant::now();
    let report = SuiteRunner::new(verifier).run(cases).await;

    assert!(report.is_success(), "{}", report);
    assert_eq!(transport.call_count(), 3);
    assert!(started.elapsed() < Duration::from_millis(280));
}

#[tokio::test]
async fn test_transport_failure_does_not_stop_suite() {
    let transport = Arc::new(
        MockTransport::new()
            .fail(TransportError::timeout(50))
            .respond(json_response(200, authors_list())),
    );
    let verifier = Arc::new(create_verifier(transport));
    let cases = vec![
        SuiteCase::new("first", VerificationRequest::get("Authors")),
        SuiteCase::new("second", VerificationRequest::get("Authors")),
    ];

    let report = SuiteRunner::new(verifier).with_max_concurrency(1).run(cases).await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.passed(), 1);
    let first = report.cases[0].result.outcome().unwrap();
    assert_eq!(first.violations[0].kind, ViolationKind::Transport);
    assert_eq!(first.violations[0].rule, "timeout");
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let transport = Arc::new(MockTransport::new().always(empty_response(200)));
    let verifier = Arc::new(create_verifier(transport));
    let cases = vec![SuiteCase::new("delete", VerificationRequest::delete("Users", json!(1)))];

    let report = SuiteRunner::new(verifier).run(cases).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["cases"][0]["name"], json!("delete"));
    assert_eq!(json["cases"][0]["result"], json!("completed"));
    assert_eq!(json["cases"][0]["passed"], json!(true));
}

#[test]
fn test_builtin_suite_round_trips_through_json() {
    let cases = fake_rest_api_suite();
    let json = serde_json::to_string(&cases).unwrap();
    let parsed: Vec<SuiteCase> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, cases);
}
