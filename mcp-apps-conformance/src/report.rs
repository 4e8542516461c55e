//! Conformance reports and issue tracking

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use tracing::info;

use crate::config::{ConformanceConfig, OutputFormat};
use crate::generator::generate_test_cases;
use crate::grading::{GradeLetter, GradeSeverity, ScoreSummary};
use crate::runner::{run_suite, TestCaseOutcome, TestCaseStatus};
use crate::schema::{host_context_schema, HOST_CONTEXT_KEY};
use crate::transcript::Transcript;
use crate::unexpected::{find_unexpected, UnexpectedProperty};
use crate::union_groups::{check_union_groups, UnionViolation};
use crate::validator::{validate, ValidationResult};
use crate::{ConformanceError, ConformanceResult};

/// Conformance report for one host context payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Where the payload came from (file name, host name, ..)
    pub source: String,

    /// When the report was produced
    pub timestamp: DateTime<Utc>,

    /// MCP Apps protocol version announced by the host, if seen
    pub protocol_version: Option<String>,

    /// Overall compliance status
    pub status: ComplianceStatus,

    /// Presence walk of the payload
    pub validation: ValidationResult,

    /// Every generated test case with its result, in suite order
    pub test_results: Vec<TestCaseOutcome>,

    /// Host properties with no schema counterpart
    pub unexpected: Vec<UnexpectedProperty>,

    /// Union groups none of whose fields were provided
    pub union_violations: Vec<UnionViolation>,

    /// Aggregate score and grade
    pub score: ScoreSummary,

    /// Issues derived from all of the above
    pub issues: Vec<ValidationIssue>,
}

/// Overall compliance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    /// Grade in the pass bucket
    Compliant,
    /// Grade in the warn bucket
    Warning,
    /// Grade in the fail bucket
    NonCompliant,
    /// No host context was available to check
    Error,
}

/// Individual conformance issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity level of the issue
    pub severity: IssueSeverity,

    /// Category of the issue (e.g., "presence", "type", "enum")
    pub category: String,

    /// Human-readable description of the issue
    pub description: String,

    /// Host context path the issue refers to
    pub location: Option<String>,

    /// Suggested fix for the issue
    pub suggestion: Option<String>,
}

/// Severity levels for conformance issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueSeverity {
    /// Informational message
    Info,
    /// Warning that should be addressed
    Warning,
    /// Error that breaks conformance
    Error,
    /// Nothing could be checked
    Critical,
}

impl From<GradeSeverity> for ComplianceStatus {
    fn from(severity: GradeSeverity) -> Self {
        match severity {
            GradeSeverity::Pass => ComplianceStatus::Compliant,
            GradeSeverity::Warn => ComplianceStatus::Warning,
            GradeSeverity::Fail => ComplianceStatus::NonCompliant,
        }
    }
}

impl ConformanceReport {
    /// Check `payload` (`{ "hostContext": { .. } }`) and build a report
    pub fn evaluate(source: impl Into<String>, payload: &Value, config: &ConformanceConfig) -> Self {
        let source = source.into();
        info!("Evaluating host context from {}", source);

        let schema = host_context_schema();
        let live = payload.get(HOST_CONTEXT_KEY).filter(|v| v.is_object());

        let validation = validate(payload);
        let cases = generate_test_cases(schema);
        let test_results = run_suite(&cases, live.unwrap_or(&Value::Null));
        let unexpected = live
            .map(|ctx| find_unexpected(ctx, schema, ""))
            .unwrap_or_default();
        let union_violations = live
            .map(|ctx| check_union_groups(schema, ctx))
            .unwrap_or_default();
        let score = ScoreSummary::from_outcomes(&test_results, &config.scoring);

        let status = if live.is_some() {
            ComplianceStatus::from(score.grade.severity)
        } else {
            ComplianceStatus::Error
        };

        let mut report = Self {
            source,
            timestamp: Utc::now(),
            protocol_version: None,
            status,
            validation,
            test_results,
            unexpected,
            union_violations,
            score,
            issues: Vec::new(),
        };
        report.issues = report.derive_issues(live.is_some(), config);

        info!(
            grade = report.score.grade.letter.as_str(),
            percentage = report.score.percentage,
            issues = report.issues.len(),
            "Host context evaluated"
        );
        report
    }

    /// Check the host context a captured transcript ends with
    pub fn from_transcript(
        source: impl Into<String>,
        transcript: &Transcript,
        config: &ConformanceConfig,
    ) -> ConformanceResult<Self> {
        let source = source.into();
        let tracker = transcript.tracker();
        let payload = transcript
            .host_context_payload_from(&tracker)
            .ok_or_else(|| ConformanceError::no_host_context(source.clone()))?;

        let report = Self::evaluate(source, &payload, config);
        Ok(match tracker.protocol_version() {
            Some(version) => report.with_protocol_version(version),
            None => report,
        })
    }

    /// Record the protocol version the host announced
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = Some(version.into());
        self
    }

    fn derive_issues(&self, has_context: bool, config: &ConformanceConfig) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !has_context {
            issues.push(
                ValidationIssue::new(
                    IssueSeverity::Critical,
                    "presence",
                    format!("Payload carries no {} object", HOST_CONTEXT_KEY),
                )
                .with_suggestion("Return hostContext in the ui/initialize result"),
            );
            return issues;
        }

        for outcome in &self.test_results {
            let case = &outcome.case;
            let result = &outcome.result;
            let issue = match result.status {
                TestCaseStatus::Provided => continue,
                TestCaseStatus::Missing if case.optional => ValidationIssue::new(
                    IssueSeverity::Info,
                    "presence",
                    format!("Optional field {} not provided", case.path),
                ),
                TestCaseStatus::Missing => ValidationIssue::new(
                    IssueSeverity::Error,
                    "presence",
                    format!("Required field {} not provided", case.path),
                )
                .with_suggestion(format!("Provide {} as {}", case.path, case.expected_type)),
                TestCaseStatus::Invalid => ValidationIssue::new(
                    IssueSeverity::Error,
                    "type",
                    format!("{}: {}", case.path, result.message),
                ),
                TestCaseStatus::Warn => ValidationIssue::new(
                    IssueSeverity::Warning,
                    "enum",
                    format!("{}: {}", case.path, result.message),
                ),
            };
            issues.push(issue.with_location(case.path.clone()));
        }

        if config.checks.unexpected_properties {
            for property in &self.unexpected {
                issues.push(
                    ValidationIssue::new(
                        IssueSeverity::Info,
                        "unexpected",
                        format!("Undeclared property {} ({})", property.path, property.value_type),
                    )
                    .with_location(property.path.clone()),
                );
            }
        }

        if config.checks.union_groups {
            for violation in &self.union_violations {
                issues.push(
                    ValidationIssue::new(IssueSeverity::Warning, "union", violation.describe())
                        .with_location(violation.path.clone()),
                );
            }
        }

        issues
    }

    /// Check if the host is compliant
    pub fn is_compliant(&self) -> bool {
        matches!(
            self.status,
            ComplianceStatus::Compliant | ComplianceStatus::Warning
        )
    }

    /// True when the grade is at least `minimum` and there was something to grade
    pub fn meets(&self, minimum: GradeLetter) -> bool {
        self.status != ComplianceStatus::Error && self.score.grade.letter.meets(minimum)
    }

    /// Get issues by severity level
    pub fn issues_by_severity(&self, severity: IssueSeverity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Get critical and error issues
    pub fn critical_issues(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i.severity, IssueSeverity::Critical | IssueSeverity::Error))
            .collect()
    }

    /// Outcomes with a given status
    pub fn outcomes_with(&self, status: TestCaseStatus) -> impl Iterator<Item = &TestCaseOutcome> {
        self.test_results
            .iter()
            .filter(move |o| o.result.status == status)
    }

    /// Generate a summary string
    pub fn summary(&self) -> String {
        format!(
            "MCP Apps Host Context Report: {} - grade {} ({:.1}%), {}/{} checks passed, {} issues found",
            self.status_string(),
            self.score.grade.letter,
            self.score.percentage,
            self.score.passed,
            self.score.scored(),
            self.issues.len()
        )
    }

    /// Get status as string
    pub fn status_string(&self) -> &'static str {
        match self.status {
            ComplianceStatus::Compliant => "COMPLIANT",
            ComplianceStatus::Warning => "WARNING",
            ComplianceStatus::NonCompliant => "NON-COMPLIANT",
            ComplianceStatus::Error => "ERROR",
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat, color: bool, max_listed: usize) -> ConformanceResult<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text(color, max_listed)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }

    /// Human-readable report
    pub fn render_text(&self, color: bool, max_listed: usize) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", paint_bold("MCP Apps Host Context Report", color));
        let _ = writeln!(out, "Source:    {}", self.source);
        let _ = writeln!(
            out,
            "Protocol:  {}",
            self.protocol_version.as_deref().unwrap_or("unknown")
        );
        let _ = writeln!(out, "Generated: {}", self.timestamp.to_rfc3339());
        let _ = writeln!(out, "Status:    {}", paint_status(self.status, self.status_string(), color));
        let _ = writeln!(
            out,
            "Grade:     {} ({:.1}%, {} of {} scored checks passed, {} skipped)",
            self.score.grade.letter,
            self.score.percentage,
            self.score.passed,
            self.score.scored(),
            self.score.skipped
        );

        let _ = writeln!(out, "\nTest cases ({})", self.test_results.len());
        for outcome in &self.test_results {
            let detail = match (&outcome.result.status, &outcome.result.actual_value) {
                (TestCaseStatus::Provided, Some(value)) => value.to_string(),
                _ => outcome.result.message.clone(),
            };
            let optional = if outcome.case.optional { " (optional)" } else { "" };
            let _ = writeln!(
                out,
                "  {} {}{}  {}",
                paint_outcome(outcome.result.status, color),
                outcome.case.path,
                optional,
                detail
            );
        }

        if !self.unexpected.is_empty() {
            let _ = writeln!(out, "\nUnexpected properties ({})", self.unexpected.len());
            for property in self.unexpected.iter().take(max_listed) {
                let _ = writeln!(out, "  {} ({})", property.path, property.value_type);
            }
            if self.unexpected.len() > max_listed {
                let _ = writeln!(out, "  ... {} more", self.unexpected.len() - max_listed);
            }
        }

        if !self.union_violations.is_empty() {
            let _ = writeln!(out, "\nUnion groups ({})", self.union_violations.len());
            for violation in &self.union_violations {
                let _ = writeln!(out, "  {}", violation.describe());
            }
        }

        let _ = writeln!(out, "\n{}", self.summary());
        out
    }
}

fn paint_bold(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn paint_status(status: ComplianceStatus, label: &str, color: bool) -> String {
    if !color {
        return label.to_string();
    }
    match status {
        ComplianceStatus::Compliant => label.green().to_string(),
        ComplianceStatus::Warning => label.yellow().to_string(),
        ComplianceStatus::NonCompliant | ComplianceStatus::Error => label.red().to_string(),
    }
}

fn paint_outcome(status: TestCaseStatus, color: bool) -> String {
    let label = format!("{:<8}", status.as_str());
    if !color {
        return label;
    }
    match status {
        TestCaseStatus::Provided => label.green().to_string(),
        TestCaseStatus::Warn => label.yellow().to_string(),
        TestCaseStatus::Invalid => label.red().to_string(),
        TestCaseStatus::Missing => label.dimmed().to_string(),
    }
}

impl ValidationIssue {
    /// Create a new validation issue
    pub fn new(severity: IssueSeverity, category: &str, description: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.to_string(),
            description: description.into(),
            location: None,
            suggestion: None,
        }
    }

    /// Add a suggestion for fixing the issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add location information
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
