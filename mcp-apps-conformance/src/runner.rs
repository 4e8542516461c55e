//! Running generated test cases against live host data

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::generator::TestCaseDescriptor;
use crate::path::get_path;
use crate::value_type::{observed_type, JsonType, UNDEFINED_TYPE_NAME};

/// Verdict for one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseStatus {
    /// Present, well-typed, and documented
    Provided,
    /// Not present in the host data
    Missing,
    /// Present with the wrong type
    Invalid,
    /// Well-typed but outside the documented values
    Warn,
}

impl TestCaseStatus {
    /// Lowercase status name
    pub fn as_str(&self) -> &'static str {
        match self {
            TestCaseStatus::Provided => "provided",
            TestCaseStatus::Missing => "missing",
            TestCaseStatus::Invalid => "invalid",
            TestCaseStatus::Warn => "warn",
        }
    }
}

impl fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one [`TestCaseDescriptor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    /// Verdict
    pub status: TestCaseStatus,
    /// Human-readable explanation
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<Value>,
    /// `None` when the value was not found, serialized as `"undefined"`
    #[serde(with = "observed_type")]
    pub actual_type: Option<JsonType>,
}

impl TestCaseResult {
    /// Observed type name, `undefined` when absent
    pub fn actual_type_name(&self) -> &'static str {
        self.actual_type.map_or(UNDEFINED_TYPE_NAME, |ty| ty.as_str())
    }
}

/// A descriptor paired with its result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseOutcome {
    /// The check that ran
    pub case: TestCaseDescriptor,
    /// What it found
    pub result: TestCaseResult,
}

/// Run a single test case against `live` (the host context object itself)
pub fn run_test_case(descriptor: &TestCaseDescriptor, live: &Value) -> TestCaseResult {
    let Some(value) = get_path(live, &descriptor.path) else {
        return TestCaseResult {
            status: TestCaseStatus::Missing,
            message: "Not provided".to_string(),
            actual_value: None,
            actual_type: None,
        };
    };

    let actual_type = JsonType::of(value);

    if !descriptor.expected_type.contains(actual_type) {
        return TestCaseResult {
            status: TestCaseStatus::Invalid,
            message: format!(
                "Expected {}, got {}",
                descriptor.expected_type, actual_type
            ),
            actual_value: Some(value.clone()),
            actual_type: Some(actual_type),
        };
    }

    if let Some(documented) = &descriptor.enum_values {
        let listed = value
            .as_str()
            .is_some_and(|s| documented.iter().any(|d| d == s));
        if !listed {
            return TestCaseResult {
                status: TestCaseStatus::Warn,
                message: format!(
                    "Undocumented value {} (expected one of: {})",
                    value,
                    documented.join(", ")
                ),
                actual_value: Some(value.clone()),
                actual_type: Some(actual_type),
            };
        }
    }

    TestCaseResult {
        status: TestCaseStatus::Provided,
        message: "OK".to_string(),
        actual_value: Some(value.clone()),
        actual_type: Some(actual_type),
    }
}

/// Run every descriptor against `live`, preserving suite order
pub fn run_suite(cases: &[TestCaseDescriptor], live: &Value) -> Vec<TestCaseOutcome> {
    let outcomes: Vec<TestCaseOutcome> = cases
        .iter()
        .map(|case| TestCaseOutcome {
            case: case.clone(),
            result: run_test_case(case, live),
        })
        .collect();

    debug!(cases = outcomes.len(), "Test suite executed");
    outcomes
}
