//! JSON runtime type tags
//!
//! Every component that needs to know "what kind of value is this" goes
//! through [`JsonType::of`], so `null` vs `object` and `array` vs `object`
//! are decided in exactly one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Closed set of JSON runtime types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// `null`
    Null,
    /// `true` or `false`
    Boolean,
    /// Integer or float
    Number,
    /// String
    String,
    /// Array
    Array,
    /// Object
    Object,
}

impl JsonType {
    /// Tag a value with its runtime type
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    /// Lowercase type name
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name used for a value that was never found
pub const UNDEFINED_TYPE_NAME: &str = "undefined";

/// Serde adapter writing `None` as `"undefined"` instead of `null`
pub(crate) mod observed_type {
    use super::{JsonType, UNDEFINED_TYPE_NAME};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write a type name, `undefined` for `None`
    pub fn serialize<S: Serializer>(value: &Option<JsonType>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ty) => serializer.serialize_str(ty.as_str()),
            None => serializer.serialize_str(UNDEFINED_TYPE_NAME),
        }
    }

    /// Read a type name, `undefined` as `None`
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonType>, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name == UNDEFINED_TYPE_NAME {
            return Ok(None);
        }
        serde_json::from_value(serde_json::Value::String(name))
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
