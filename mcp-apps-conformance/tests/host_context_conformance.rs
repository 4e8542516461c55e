//! End-to-end checks of realistic host payloads and captured sessions

use assert_matches::assert_matches;
use pulseengine_mcp_apps_conformance::{
    ComplianceStatus, ConformanceConfig, ConformanceError, ConformanceReport, GradeLetter,
    IssueSeverity, OutputFormat, TestCaseStatus, Transcript,
};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn minimal_host() -> serde_json::Value {
    json!({
        "hostContext": {
            "theme": "light",
            "displayMode": "inline",
            "locale": "en-US",
            "timeZone": "America/New_York",
            "platform": "web"
        }
    })
}

#[test]
fn minimal_host_scores_full_marks() {
    let report = ConformanceReport::evaluate("minimal", &minimal_host(), &ConformanceConfig::default());

    assert_eq!(report.score.total, 23);
    assert_eq!(report.score.provided, 5);
    assert_eq!(report.score.skipped, 18);
    assert_eq!(report.score.scored(), 5);
    assert_eq!(report.score.grade.letter, GradeLetter::A);
    assert_eq!(report.status, ComplianceStatus::Compliant);
    assert!(report.critical_issues().is_empty());
    assert_eq!(report.issues_by_severity(IssueSeverity::Info).len(), 18);
}

#[test]
fn counting_optional_fields_lowers_the_grade() {
    let mut config = ConformanceConfig::default();
    config.scoring.skip_missing_optional = false;

    let report = ConformanceReport::evaluate("minimal", &minimal_host(), &config);
    assert_eq!(report.score.skipped, 0);
    assert_eq!(report.score.scored(), 23);
    assert_eq!(report.score.grade.letter, GradeLetter::F);
    assert_eq!(report.status, ComplianceStatus::NonCompliant);
    assert!(!report.meets(GradeLetter::C));
}

#[test]
fn strict_enums_turn_warnings_into_failures() {
    let payload = json!({
        "hostContext": {
            "theme": "high-contrast",
            "displayMode": "sidebar",
            "locale": "en-US",
            "timeZone": "UTC",
            "platform": "web"
        }
    });

    let lenient = ConformanceReport::evaluate("host", &payload, &ConformanceConfig::default());
    assert_eq!(lenient.score.warned, 2);
    assert_eq!(lenient.score.percentage, 100.0);

    let mut config = ConformanceConfig::default();
    config.scoring.count_warnings_as_passed = false;
    let strict = ConformanceReport::evaluate("host", &payload, &config);
    assert_eq!(strict.score.passed, 3);
    assert_eq!(strict.score.percentage, 60.0);
    assert_eq!(strict.score.grade.letter, GradeLetter::D);
    assert_eq!(strict.status, ComplianceStatus::Warning);
}

#[test]
fn mistyped_host_is_non_compliant() {
    let payload = json!({
        "hostContext": {
            "theme": true,
            "displayMode": ["inline"],
            "locale": 1033,
            "timeZone": null,
            "platform": "web",
            "containerDimensions": {"height": "400px", "width": 320}
        }
    });
    let report = ConformanceReport::evaluate("broken", &payload, &ConformanceConfig::default());

    let invalid: Vec<&str> = report
        .outcomes_with(TestCaseStatus::Invalid)
        .map(|o| o.case.path.as_str())
        .collect();
    assert_eq!(
        invalid,
        vec!["theme", "displayMode", "containerDimensions.height", "locale", "timeZone"]
    );
    assert_eq!(report.status, ComplianceStatus::NonCompliant);
    assert!(report.validation.missing.iter().any(|p| p == "timeZone"));

    let time_zone = report
        .test_results
        .iter()
        .find(|o| o.case.path == "timeZone")
        .unwrap();
    assert_eq!(time_zone.result.message, "Expected string, got null");
}

#[test]
fn vendor_extensions_are_listed_not_scored() {
    let mut payload = minimal_host();
    payload["hostContext"]["x-acme"] = json!({"workspace": {"id": "w1"}, "beta": true});
    payload["hostContext"]["styles"] = json!({"variables": {"--acme-accent": "#f60"}});

    let report = ConformanceReport::evaluate("acme", &payload, &ConformanceConfig::default());
    let paths: Vec<&str> = report.unexpected.iter().map(|p| p.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["x-acme", "x-acme.beta", "x-acme.workspace", "x-acme.workspace.id"]
    );
    assert_eq!(report.score.grade.letter, GradeLetter::A);
    assert!(report.validation.unexpected.iter().all(|p| p.starts_with("x-acme")));
}

#[test]
fn union_groups_flag_dimensionless_containers() {
    let mut payload = minimal_host();
    payload["hostContext"]["containerDimensions"] = json!({"maxWidth": 800});

    let report = ConformanceReport::evaluate("host", &payload, &ConformanceConfig::default());
    assert_eq!(report.union_violations.len(), 1);
    assert_eq!(report.union_violations[0].label, "height");
    assert_eq!(report.score.grade.letter, GradeLetter::A);

    let union_warnings: Vec<_> = report
        .issues_by_severity(IssueSeverity::Warning)
        .into_iter()
        .filter(|i| i.category == "union")
        .collect();
    assert_eq!(union_warnings.len(), 1);
    assert_eq!(union_warnings[0].location.as_deref(), Some("containerDimensions"));
}

#[test]
fn session_transcript_tracks_context_changes() {
    let mut file = NamedTempFile::new().unwrap();
    let lines = [
        json!({"jsonrpc": "2.0", "id": "init-1", "method": "ui/initialize",
               "params": {"appInfo": {"name": "weather-view", "version": "1.0.0"}}}),
        json!({"jsonrpc": "2.0", "id": "init-1", "result": {
            "protocolVersion": "2025-06-18",
            "hostInfo": {"name": "ExampleHost", "version": "2.1"},
            "hostContext": {
                "theme": "light",
                "displayMode": "inline",
                "locale": "en-US",
                "timeZone": "UTC",
                "platform": "desktop"
            }
        }}),
        json!({"jsonrpc": "2.0", "method": "ui/notifications/initialized"}),
        json!({"jsonrpc": "2.0", "method": "ui/notifications/host-context-changed",
               "params": {"theme": "dark", "displayMode": "fullscreen"}}),
        json!({"jsonrpc": "2.0", "method": "ui/notifications/size-changed",
               "params": {"width": 400, "height": 300}}),
    ];
    for line in &lines {
        writeln!(file, "{}", line).unwrap();
    }

    let transcript = Transcript::from_file(file.path()).unwrap();
    assert_eq!(transcript.tracker().updates(), 2);

    let report = ConformanceReport::from_transcript("session", &transcript, &ConformanceConfig::default())
        .unwrap();
    assert_eq!(report.protocol_version.as_deref(), Some("2025-06-18"));
    let display_mode = report
        .test_results
        .iter()
        .find(|o| o.case.path == "displayMode")
        .unwrap();
    assert_eq!(display_mode.result.actual_value, Some(json!("fullscreen")));
    assert!(report.meets(GradeLetter::A));
}

#[test]
fn transcript_without_context_is_an_error() {
    let transcript = Transcript::parse(
        r#"[{"jsonrpc": "2.0", "id": 1, "method": "ui/initialize"},
            {"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "Method not found"}}]"#,
    )
    .unwrap();
    let error = ConformanceReport::from_transcript("failed", &transcript, &ConformanceConfig::default())
        .unwrap_err();
    assert_matches!(error, ConformanceError::NoHostContext { ref source_label } if source_label == "failed");
    assert!(error.is_input_issue());
}

#[test]
fn reports_render_in_every_format() {
    let report = ConformanceReport::evaluate("minimal", &minimal_host(), &ConformanceConfig::default());

    let json_text = report.render(OutputFormat::Json, false, 50).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(parsed["status"], "Compliant");
    assert_eq!(parsed["score"]["grade"]["letter"], "A");
    assert_eq!(parsed["test_results"][0]["case"]["path"], "toolInfo.id");
    assert_eq!(parsed["test_results"][0]["result"]["actualType"], "undefined");

    let yaml_text = report.render(OutputFormat::Yaml, false, 50).unwrap();
    assert!(yaml_text.contains("source: minimal"));

    let text = report.render(OutputFormat::Text, false, 50).unwrap();
    assert!(text.starts_with("MCP Apps Host Context Report"));
    assert!(text.contains("missing  toolInfo.id (optional)  Not provided"));
}
