//! Finding host-provided properties the schema does not know about
//!
//! Vendor extensions and typos both show up here. Known branches are checked
//! structurally, unknown branches are reported wholesale.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::path;
use crate::schema::Fields;
use crate::value_type::JsonType;

/// A property present in host data with no schema counterpart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnexpectedProperty {
    /// Dot-path of the property
    pub path: String,
    /// Value the host sent
    pub value: Value,
    #[serde(rename = "type")]
    pub value_type: JsonType,
}

/// Collect every property of `live` (a host context object) absent from `schema`.
///
/// Paths match the validator's `unexpected` list: declared fields of a level
/// are visited first, and a dotted key spelling an already visited path is
/// skipped.
pub fn find_unexpected(live: &Value, schema: &Fields, prefix: &str) -> Vec<UnexpectedProperty> {
    let mut finder = Finder::default();
    if let Value::Object(data) = live {
        finder.walk(data, schema, prefix);
    }
    finder.found
}

#[derive(Default)]
struct Finder {
    found: Vec<UnexpectedProperty>,
    seen: HashSet<String>,
}

impl Finder {
    fn walk(&mut self, data: &Map<String, Value>, schema: &Fields, prefix: &str) {
        for (name, node) in schema.iter() {
            let field_path = path::join(prefix, name);
            self.seen.insert(field_path.clone());
            if let (Some(children), Some(Value::Object(inner))) = (node.children(), data.get(name)) {
                self.walk(inner, children, &field_path);
            }
        }

        for (key, value) in data {
            if schema.contains(key) {
                continue;
            }
            let field_path = path::join(prefix, key);
            self.record(&field_path, value);
            if let Value::Object(inner) = value {
                self.record_all(inner, &field_path);
            }
        }
    }

    fn record_all(&mut self, data: &Map<String, Value>, prefix: &str) {
        for (key, value) in data {
            let field_path = path::join(prefix, key);
            self.record(&field_path, value);
            if let Value::Object(inner) = value {
                self.record_all(inner, &field_path);
            }
        }
    }

    fn record(&mut self, field_path: &str, value: &Value) {
        if !self.seen.insert(field_path.to_string()) {
            return;
        }
        self.found.push(UnexpectedProperty {
            path: field_path.to_string(),
            value: value.clone(),
            value_type: JsonType::of(value),
        });
    }
}
