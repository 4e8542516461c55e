//! Union-group checks for paired sibling fields
//!
//! A union group such as `{oneOf: [height, maxHeight]}` says at least one of
//! the listed siblings must be present. [`validate`](crate::validator::validate)
//! does not look at union groups; callers ask for this check explicitly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path;
use crate::schema::{Fields, SchemaNode};

/// A union group with none of its fields provided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionViolation {
    /// Path of the object that declares the group
    pub path: String,
    /// Group label
    pub label: String,
    /// Fields any one of which would satisfy the group
    #[serde(rename = "oneOf")]
    pub one_of: Vec<String>,
}

impl UnionViolation {
    /// One-line description for reports
    pub fn describe(&self) -> String {
        format!(
            "{} provides no {} (expected one of: {})",
            self.path,
            self.label,
            self.one_of.join(", ")
        )
    }
}

/// Check every union group whose declaring object is present in `host_context`
pub fn check_union_groups(schema: &Fields, host_context: &Value) -> Vec<UnionViolation> {
    let mut violations = Vec::new();
    if let Value::Object(data) = host_context {
        walk(schema, data, "", &mut violations);
    }
    violations
}

fn walk(schema: &Fields, data: &Map<String, Value>, prefix: &str, out: &mut Vec<UnionViolation>) {
    for (name, node) in schema.iter() {
        let SchemaNode::Interior(interior) = node else {
            continue;
        };
        let Some(Value::Object(inner)) = data.get(name) else {
            continue;
        };
        let node_path = path::join(prefix, name);

        for group in &interior.union_groups {
            let satisfied = group
                .one_of
                .iter()
                .any(|field| inner.get(field).is_some_and(|v| !v.is_null()));
            if !satisfied {
                out.push(UnionViolation {
                    path: node_path.clone(),
                    label: group.label.clone(),
                    one_of: group.one_of.clone(),
                });
            }
        }

        walk(&interior.fields, inner, &node_path, out);
    }
}
