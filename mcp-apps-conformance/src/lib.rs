//! HostContext conformance checking for MCP Apps hosts
//!
//! An MCP Apps host hands every embedded view a `hostContext` object in its
//! `ui/initialize` result and keeps it current through
//! `ui/notifications/host-context-changed`. This crate checks that object
//! against a declarative schema and grades how completely a host fills it in.
//!
//! # Features
//!
//! - **Presence validation**: missing, unexpected and valid dot-paths
//! - **Generated test suite**: one check per schema leaf, with inherited optionality
//! - **Type and enum checks**: invalid types fail, undocumented enum values warn
//! - **Unexpected properties**: every host key the schema does not declare
//! - **Grading**: pass percentage mapped to a letter grade
//! - **Transcripts**: fold captured JSON-RPC traffic into the context a view sees
//!
//! # Quick Start
//!
//! ```rust
//! use pulseengine_mcp_apps_conformance::{ConformanceConfig, ConformanceReport};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "hostContext": {
//!         "theme": "dark",
//!         "displayMode": "inline",
//!         "locale": "en-US",
//!         "timeZone": "Europe/Berlin",
//!         "platform": "web"
//!     }
//! });
//!
//! let report = ConformanceReport::evaluate("my-host", &payload, &ConformanceConfig::default());
//! assert!(report.is_compliant());
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod grading;
pub mod message;
pub mod path;
pub mod report;
pub mod runner;
pub mod schema;
pub mod transcript;
pub mod union_groups;
pub mod unexpected;
pub mod validator;
pub mod value_type;

// Re-export main types
pub use config::{ConformanceConfig, OutputFormat};
pub use error::{ConformanceError, ConformanceResult};
pub use generator::{generate_test_cases, TestCaseDescriptor};
pub use grading::{grade, Grade, GradeLetter, GradeSeverity, ScoreSummary, ScoringPolicy};
pub use message::{HostContextTracker, RpcMessage};
pub use report::{ComplianceStatus, ConformanceReport, IssueSeverity, ValidationIssue};
pub use runner::{run_suite, run_test_case, TestCaseOutcome, TestCaseResult, TestCaseStatus};
pub use schema::{host_context_schema, Fields, SchemaNode, TypeSet, HOST_CONTEXT_KEY};
pub use transcript::Transcript;
pub use union_groups::{check_union_groups, UnionViolation};
pub use unexpected::{find_unexpected, UnexpectedProperty};
pub use validator::{classify, validate, validate_against, PathStatus, ValidationResult};
pub use value_type::JsonType;

/// Check a `{ "hostContext": { .. } }` payload with default settings
pub fn check_host_context(payload: &serde_json::Value) -> ConformanceReport {
    ConformanceReport::evaluate("payload", payload, &ConformanceConfig::default())
}

#[cfg(test)]
mod lib_tests;
