//! Test case generation from the schema
//!
//! Every schema leaf becomes exactly one [`TestCaseDescriptor`]. Interior
//! nodes only contribute their path and their optionality, which flows down
//! to every descendant.

use serde::{Deserialize, Serialize};

use crate::path;
use crate::schema::{Fields, SchemaNode, TypeSet};

/// One leaf-level conformance check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseDescriptor {
    /// Dot-path of the leaf, relative to the host context
    pub path: String,
    /// Acceptable JSON types
    pub expected_type: TypeSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Effective optionality, including any optional ancestor
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
}

/// Generate the full suite for `schema`
pub fn generate_test_cases(schema: &Fields) -> Vec<TestCaseDescriptor> {
    generate_test_cases_at(schema, "", false)
}

/// Generate the suite for `schema` mounted at `prefix` beneath an ancestor
/// whose effective optionality is `parent_optional`
pub fn generate_test_cases_at(
    schema: &Fields,
    prefix: &str,
    parent_optional: bool,
) -> Vec<TestCaseDescriptor> {
    let mut cases = Vec::new();
    collect(schema, prefix, parent_optional, &mut cases);
    cases
}

fn collect(schema: &Fields, prefix: &str, parent_optional: bool, out: &mut Vec<TestCaseDescriptor>) {
    for (name, node) in schema.iter() {
        let field_path = path::join(prefix, name);
        let optional = parent_optional || node.is_optional();

        match node {
            SchemaNode::Interior(interior) => {
                collect(&interior.fields, &field_path, optional, out);
            }
            SchemaNode::Leaf(leaf) => out.push(TestCaseDescriptor {
                path: field_path,
                expected_type: leaf.types.clone(),
                enum_values: leaf.enum_values.clone(),
                optional,
                parent_path: (!prefix.is_empty()).then(|| prefix.to_string()),
            }),
        }
    }
}
