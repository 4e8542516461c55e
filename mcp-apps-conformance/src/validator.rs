//! Presence validation of a received host context
//!
//! The validator answers one question per path: was a schema field provided,
//! left out, or is the data carrying something the schema never declared?
//! Type checking is deliberately left to the [`runner`](crate::runner).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::path;
use crate::schema::{host_context_schema, Fields, HOST_CONTEXT_KEY};

/// Outcome of one validation walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Schema fields that were absent or `null`
    pub missing: Vec<String>,
    /// Data keys with no schema counterpart, including everything beneath them
    pub unexpected: Vec<String>,
    /// Schema fields that carried a value
    pub valid: Vec<String>,
}

/// Classification of a single path against a [`ValidationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStatus {
    /// Declared and absent or `null`
    Missing,
    /// Undeclared, or beneath an undeclared key
    Unexpected,
    /// Declared and present
    Valid,
}

impl ValidationResult {
    /// Nothing was checked
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.valid.is_empty()
    }

    /// No missing fields and no unexpected data
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Shorthand for [`classify`]
    pub fn status_of(&self, path: &str) -> PathStatus {
        classify(path, self)
    }
}

/// Validate `{ "hostContext": { .. } }` against the HostContext schema
pub fn validate(data: &Value) -> ValidationResult {
    validate_against(host_context_schema(), data)
}

/// Validate `{ "hostContext": { .. } }` against an arbitrary schema.
///
/// A payload without an object-valued `hostContext` yields an empty result.
pub fn validate_against(schema: &Fields, data: &Value) -> ValidationResult {
    let Some(host_context) = data.get(HOST_CONTEXT_KEY).and_then(Value::as_object) else {
        debug!("No {} object in payload, nothing to validate", HOST_CONTEXT_KEY);
        return ValidationResult::default();
    };

    let mut walk = Walk::default();
    walk.fields(schema, host_context, "");
    let result = walk.result;

    debug!(
        missing = result.missing.len(),
        unexpected = result.unexpected.len(),
        valid = result.valid.len(),
        "Host context validated"
    );
    result
}

/// Walk state. A data key containing `.` can spell the same path as a nested
/// field, so every path is recorded at most once, in whichever list it reaches
/// first. Declared fields of a level are walked before its undeclared keys.
#[derive(Default)]
struct Walk {
    result: ValidationResult,
    seen: HashSet<String>,
}

impl Walk {
    fn record(&mut self, status: PathStatus, field_path: &str) {
        if !self.seen.insert(field_path.to_string()) {
            return;
        }
        let list = match status {
            PathStatus::Missing => &mut self.result.missing,
            PathStatus::Unexpected => &mut self.result.unexpected,
            PathStatus::Valid => &mut self.result.valid,
        };
        list.push(field_path.to_string());
    }

    fn fields(&mut self, schema: &Fields, data: &Map<String, Value>, prefix: &str) {
        for (name, node) in schema.iter() {
            let field_path = path::join(prefix, name);
            match data.get(name) {
                None | Some(Value::Null) => self.record(PathStatus::Missing, &field_path),
                Some(value) => {
                    self.record(PathStatus::Valid, &field_path);
                    if let (Some(children), Value::Object(inner)) = (node.children(), value) {
                        self.fields(children, inner, &field_path);
                    }
                }
            }
        }

        for (key, value) in data {
            if schema.contains(key) {
                continue;
            }
            let field_path = path::join(prefix, key);
            self.record(PathStatus::Unexpected, &field_path);
            if let Value::Object(inner) = value {
                self.mark_all(inner, &field_path);
            }
        }
    }

    /// Every key beneath an unknown branch is unexpected as well
    fn mark_all(&mut self, data: &Map<String, Value>, prefix: &str) {
        for (key, value) in data {
            let field_path = path::join(prefix, key);
            self.record(PathStatus::Unexpected, &field_path);
            if let Value::Object(inner) = value {
                self.mark_all(inner, &field_path);
            }
        }
    }
}

/// Classify `path` against a finished validation.
///
/// Unexpected entries also cover their whole subtree, so rows nested under an
/// unknown branch are unexpected even if the walk never listed them.
pub fn classify(path: &str, result: &ValidationResult) -> PathStatus {
    if result.missing.iter().any(|p| p == path) {
        return PathStatus::Missing;
    }
    if result.unexpected.iter().any(|p| p == path) {
        return PathStatus::Unexpected;
    }
    if result
        .unexpected
        .iter()
        .any(|ancestor| path::is_descendant(path, ancestor))
    {
        return PathStatus::Unexpected;
    }
    PathStatus::Valid
}
