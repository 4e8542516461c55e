//! Tests for lib.rs functionality

#[cfg(test)]
mod tests {
    use crate::*;
    use assert_matches::assert_matches;
    use serde_json::{json, Value};

    fn complete_host_context() -> Value {
        json!({
            "hostContext": {
                "toolInfo": {
                    "id": "call-17",
                    "tool": {
                        "name": "get_weather",
                        "description": "Current weather",
                        "inputSchema": {"type": "object"}
                    }
                },
                "theme": "light",
                "styles": {
                    "variables": {"--color-background-primary": "#ffffff"},
                    "css": {"fonts": "@font-face { font-family: Inter; }"}
                },
                "displayMode": "fullscreen",
                "availableDisplayModes": ["inline", "fullscreen"],
                "containerDimensions": {
                    "height": 480,
                    "maxHeight": 900,
                    "width": 640,
                    "maxWidth": 1200
                },
                "locale": "de-DE",
                "timeZone": "Europe/Berlin",
                "userAgent": "ExampleHost/2.1",
                "platform": "desktop",
                "deviceCapabilities": {"touch": false, "hover": true},
                "safeAreaInsets": {"top": 0, "right": 0, "bottom": 12, "left": 0}
            }
        })
    }

    fn case(path: &str) -> TestCaseDescriptor {
        generate_test_cases(host_context_schema())
            .into_iter()
            .find(|c| c.path == path)
            .unwrap()
    }

    #[test]
    fn test_empty_host_context() {
        let result = validate(&json!({"hostContext": {}}));
        for required in ["theme", "displayMode", "locale", "timeZone", "platform"] {
            assert!(result.missing.iter().any(|p| p == required), "{required}");
        }
        assert!(result.valid.is_empty());
        assert!(result.unexpected.is_empty());
    }

    #[test]
    fn test_required_only_host_context() {
        // absent optional fields are still reported missing; only scoring skips them
        let payload = json!({
            "hostContext": {
                "theme": "dark",
                "displayMode": "inline",
                "locale": "en-US",
                "timeZone": "UTC",
                "platform": "mobile"
            }
        });
        let result = validate(&payload);
        assert_eq!(
            result.missing,
            vec![
                "toolInfo",
                "styles",
                "availableDisplayModes",
                "containerDimensions",
                "userAgent",
                "deviceCapabilities",
                "safeAreaInsets"
            ]
        );
        assert_eq!(result.valid, vec!["theme", "displayMode", "locale", "timeZone", "platform"]);
        assert!(result.unexpected.is_empty());

        let report = check_host_context(&payload);
        assert_eq!(report.score.percentage, 100.0);
        assert!(report.critical_issues().is_empty());
    }

    #[test]
    fn test_complete_host_context() {
        let payload = complete_host_context();
        let result = validate(&payload);
        assert!(result.missing.is_empty());
        assert!(result.unexpected.is_empty());
        assert!(result.is_clean());

        let live = &payload[HOST_CONTEXT_KEY];
        assert!(find_unexpected(live, host_context_schema(), "").is_empty());
        assert!(check_union_groups(host_context_schema(), live).is_empty());

        let report = check_host_context(&payload);
        assert_eq!(report.score.total, 23);
        assert_eq!(report.score.provided, 23);
        assert_eq!(report.score.percentage, 100.0);
        assert_eq!(report.status, ComplianceStatus::Compliant);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let schema = host_context_schema();
        assert_eq!(generate_test_cases(schema), generate_test_cases(schema));
    }

    #[test]
    fn test_inherited_optionality() {
        assert!(case("toolInfo.tool.name").optional);
        assert!(case("safeAreaInsets.top").optional);
        assert!(!case("theme").optional);
        assert_eq!(case("toolInfo.tool.name").parent_path.as_deref(), Some("toolInfo.tool"));
    }

    #[test]
    fn test_absent_is_missing_regardless_of_type() {
        let live = json!({});
        for path in ["theme", "toolInfo.id", "deviceCapabilities.touch", "styles.variables"] {
            let result = run_test_case(&case(path), &live);
            assert_matches!(result.status, TestCaseStatus::Missing);
            assert_eq!(result.actual_type_name(), "undefined");
        }
    }

    #[test]
    fn test_well_typed_values_are_provided() {
        let live = json!({"theme": "dark", "toolInfo": {"id": 42}, "availableDisplayModes": []});
        for path in ["theme", "toolInfo.id", "availableDisplayModes"] {
            assert_matches!(run_test_case(&case(path), &live).status, TestCaseStatus::Provided);
        }
    }

    #[test]
    fn test_undocumented_theme_warns() {
        let result = run_test_case(&case("theme"), &json!({"theme": "solarized"}));
        assert_matches!(result.status, TestCaseStatus::Warn);
        assert_eq!(result.actual_type, Some(JsonType::String));
        assert!(result.message.contains("solarized"));
        assert!(result.message.contains("light"));
        assert!(result.message.contains("dark"));
    }

    #[test]
    fn test_numeric_display_mode_is_invalid() {
        let result = run_test_case(&case("displayMode"), &json!({"displayMode": 3}));
        assert_matches!(result.status, TestCaseStatus::Invalid);
        assert_eq!(result.actual_type, Some(JsonType::Number));
        assert_eq!(result.actual_value, Some(json!(3)));
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(grade(85.0).letter, GradeLetter::B);
        assert_eq!(grade(85.0).severity, GradeSeverity::Pass);
        assert_eq!(grade(65.0).letter, GradeLetter::D);
        assert_eq!(grade(65.0).severity, GradeSeverity::Warn);
        assert_eq!(grade(40.0).letter, GradeLetter::F);
        assert_eq!(grade(40.0).severity, GradeSeverity::Fail);
    }

    #[test]
    fn test_unexpected_subtree() {
        let found = find_unexpected(&json!({"foo": {"bar": 1}}), host_context_schema(), "");
        let paths: Vec<&str> = found.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["foo", "foo.bar"]);
        assert_eq!(found[0].value_type, JsonType::Object);
        assert_eq!(found[1].value_type, JsonType::Number);
    }

    #[test]
    fn test_classify_descendants_of_unexpected() {
        let result = validate(&json!({"hostContext": {"theme": "dark", "vendor": {"build": 7}}}));
        assert_eq!(classify("vendor.build", &result), PathStatus::Unexpected);
        assert_eq!(classify("vendor.build.deeper", &result), PathStatus::Unexpected);
        assert_eq!(classify("vendorX", &result), PathStatus::Valid);
        assert_eq!(classify("locale", &result), PathStatus::Missing);
        assert_eq!(classify("theme", &result), PathStatus::Valid);
    }

    #[test]
    fn test_dotted_keys_never_repeat_a_path() {
        let result = validate(&json!({"hostContext": {"a.b": 1, "a": {"b": 2}}}));
        assert_eq!(result.unexpected, vec!["a", "a.b"]);

        let result = validate(&json!({
            "hostContext": {"containerDimensions.height": 1, "containerDimensions": {"height": 5}}
        }));
        assert!(result.valid.iter().any(|p| p == "containerDimensions.height"));
        assert!(result.unexpected.is_empty());
        assert_eq!(
            classify("containerDimensions.height", &result),
            PathStatus::Valid
        );
    }

    #[test]
    fn test_payload_without_host_context() {
        for payload in [json!(null), json!([]), json!({"hostContext": "dark"}), json!({})] {
            assert!(validate(&payload).is_empty());
            assert_matches!(check_host_context(&payload).status, ComplianceStatus::Error);
        }
    }
}
