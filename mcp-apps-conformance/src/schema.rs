//! HostContext schema definition
//!
//! The schema is a small tagged tree: a [`SchemaNode`] is either a leaf with
//! a set of acceptable JSON types, or an interior node with ordered children.
//! Declaration order matters, it is the order test cases are generated in.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_type::JsonType;

/// Key under which a payload carries the host context
pub const HOST_CONTEXT_KEY: &str = "hostContext";

/// One or more acceptable JSON types for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeSetRepr", into = "TypeSetRepr")]
pub struct TypeSet(Vec<JsonType>);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TypeSetRepr {
    One(JsonType),
    Many(Vec<JsonType>),
}

impl From<TypeSetRepr> for TypeSet {
    fn from(repr: TypeSetRepr) -> Self {
        match repr {
            TypeSetRepr::One(ty) => TypeSet(vec![ty]),
            TypeSetRepr::Many(types) => TypeSet(types),
        }
    }
}

impl From<TypeSet> for TypeSetRepr {
    fn from(set: TypeSet) -> Self {
        if set.0.len() == 1 {
            TypeSetRepr::One(set.0[0])
        } else {
            TypeSetRepr::Many(set.0)
        }
    }
}

impl TypeSet {
    /// Exactly one acceptable type
    pub fn single(ty: JsonType) -> Self {
        TypeSet(vec![ty])
    }

    /// Several acceptable types, duplicates dropped
    pub fn any_of(types: impl IntoIterator<Item = JsonType>) -> Self {
        let mut set = Vec::new();
        for ty in types {
            if !set.contains(&ty) {
                set.push(ty);
            }
        }
        TypeSet(set)
    }

    /// Whether `ty` is acceptable
    pub fn contains(&self, ty: JsonType) -> bool {
        self.0.contains(&ty)
    }

    /// Acceptable types in declaration order
    pub fn types(&self) -> &[JsonType] {
        &self.0
    }

    /// More than one type is acceptable
    pub fn is_union(&self) -> bool {
        self.0.len() > 1
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(JsonType::as_str).collect();
        f.write_str(&names.join(" | "))
    }
}

/// "At least one of these sibling fields must be present"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionGroup {
    /// Sibling field names, any one of which satisfies the group
    #[serde(rename = "oneOf")]
    pub one_of: Vec<String>,
    /// Short name used in reports
    pub label: String,
}

/// A field that holds a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSchema {
    /// Acceptable JSON types
    pub types: TypeSet,
    /// Documented string values, if the field is a closed set
    pub enum_values: Option<Vec<String>>,
    /// Declared optional at this level
    pub optional: bool,
}

/// A field that holds a nested object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteriorSchema {
    /// Child fields in declaration order
    pub fields: Fields,
    /// Declared optional at this level
    pub optional: bool,
    /// At-least-one constraints over the children
    pub union_groups: Vec<UnionGroup>,
}

/// One node of the schema tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    /// Holds a value
    Leaf(LeafSchema),
    /// Holds a nested object
    Interior(InteriorSchema),
}

impl SchemaNode {
    /// Required leaf accepting a single type
    pub fn leaf(ty: JsonType) -> Self {
        Self::leaf_any([ty])
    }

    /// Required leaf accepting any of `types`
    pub fn leaf_any(types: impl IntoIterator<Item = JsonType>) -> Self {
        SchemaNode::Leaf(LeafSchema {
            types: TypeSet::any_of(types),
            enum_values: None,
            optional: false,
        })
    }

    /// Required interior node
    pub fn interior(fields: Fields) -> Self {
        SchemaNode::Interior(InteriorSchema {
            fields,
            optional: false,
            union_groups: Vec::new(),
        })
    }

    /// Mark this node optional
    pub fn optional(mut self) -> Self {
        match &mut self {
            SchemaNode::Leaf(leaf) => leaf.optional = true,
            SchemaNode::Interior(interior) => interior.optional = true,
        }
        self
    }

    /// Restrict a leaf to documented values. Ignored on interior nodes.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let SchemaNode::Leaf(leaf) = &mut self {
            leaf.enum_values = Some(values.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Attach a union group to an interior node. Ignored on leaves.
    pub fn with_union_group<I, S>(mut self, label: &str, one_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let SchemaNode::Interior(interior) = &mut self {
            interior.union_groups.push(UnionGroup {
                one_of: one_of.into_iter().map(Into::into).collect(),
                label: label.to_string(),
            });
        }
        self
    }

    /// Declared optionality of this node alone
    pub fn is_optional(&self) -> bool {
        match self {
            SchemaNode::Leaf(leaf) => leaf.optional,
            SchemaNode::Interior(interior) => interior.optional,
        }
    }

    /// Child fields of an interior node
    pub fn children(&self) -> Option<&Fields> {
        match self {
            SchemaNode::Leaf(_) => None,
            SchemaNode::Interior(interior) => Some(&interior.fields),
        }
    }

    /// Types a value for this node may have. Interior nodes are objects.
    pub fn expected_types(&self) -> TypeSet {
        match self {
            SchemaNode::Leaf(leaf) => leaf.types.clone(),
            SchemaNode::Interior(_) => TypeSet::single(JsonType::Object),
        }
    }
}

/// Ordered set of named schema nodes at one level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, SchemaNode)>);

impl Fields {
    /// Empty field list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field, replacing any earlier declaration with the same name
    pub fn with(mut self, name: &str, node: SchemaNode) -> Self {
        self.0.retain(|(existing, _)| existing != name);
        self.0.push((name.to_string(), node));
        self
    }

    /// Node declared under `name`
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    /// Whether `name` is declared
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of fields at this level
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No fields at this level
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of levels in the tree rooted at these fields
    pub fn depth(&self) -> usize {
        self.iter()
            .map(|(_, node)| match node.children() {
                Some(children) => 1 + children.depth(),
                None => 1,
            })
            .max()
            .unwrap_or(0)
    }
}

static HOST_CONTEXT_SCHEMA: Lazy<Fields> = Lazy::new(build_host_context_schema);

/// The process-wide HostContext schema
pub fn host_context_schema() -> &'static Fields {
    &HOST_CONTEXT_SCHEMA
}

fn build_host_context_schema() -> Fields {
    use JsonType::{Array, Boolean, Number, Object};

    let tool = Fields::new()
        .with("name", SchemaNode::leaf(JsonType::String))
        .with("description", SchemaNode::leaf(JsonType::String).optional())
        .with("inputSchema", SchemaNode::leaf(Object));

    let tool_info = Fields::new()
        .with("id", SchemaNode::leaf_any([JsonType::String, Number]).optional())
        .with("tool", SchemaNode::interior(tool));

    let css = Fields::new().with("fonts", SchemaNode::leaf(JsonType::String).optional());

    // `variables` is an open record of CSS custom properties, so it is a leaf
    let styles = Fields::new()
        .with("variables", SchemaNode::leaf(Object).optional())
        .with("css", SchemaNode::interior(css).optional());

    let dimensions = Fields::new()
        .with("height", SchemaNode::leaf(Number).optional())
        .with("maxHeight", SchemaNode::leaf(Number).optional())
        .with("width", SchemaNode::leaf(Number).optional())
        .with("maxWidth", SchemaNode::leaf(Number).optional());

    let device = Fields::new()
        .with("touch", SchemaNode::leaf(Boolean).optional())
        .with("hover", SchemaNode::leaf(Boolean).optional());

    let insets = Fields::new()
        .with("top", SchemaNode::leaf(Number))
        .with("right", SchemaNode::leaf(Number))
        .with("bottom", SchemaNode::leaf(Number))
        .with("left", SchemaNode::leaf(Number));

    Fields::new()
        .with("toolInfo", SchemaNode::interior(tool_info).optional())
        .with("theme", SchemaNode::leaf(JsonType::String).with_enum(["light", "dark"]))
        .with("styles", SchemaNode::interior(styles).optional())
        .with(
            "displayMode",
            SchemaNode::leaf(JsonType::String).with_enum(["inline", "fullscreen", "pip"]),
        )
        .with("availableDisplayModes", SchemaNode::leaf(Array).optional())
        .with(
            "containerDimensions",
            SchemaNode::interior(dimensions)
                .optional()
                .with_union_group("height", ["height", "maxHeight"])
                .with_union_group("width", ["width", "maxWidth"]),
        )
        .with("locale", SchemaNode::leaf(JsonType::String))
        .with("timeZone", SchemaNode::leaf(JsonType::String))
        .with("userAgent", SchemaNode::leaf(JsonType::String).optional())
        .with(
            "platform",
            SchemaNode::leaf(JsonType::String).with_enum(["web", "desktop", "mobile"]),
        )
        .with("deviceCapabilities", SchemaNode::interior(device).optional())
        .with("safeAreaInsets", SchemaNode::interior(insets).optional())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_shape() {
        let schema = host_context_schema();
        assert_eq!(schema.len(), 12);
        assert!(schema.depth() <= 4);
        assert!(matches!(schema.get("theme"), Some(SchemaNode::Leaf(_))));
        assert!(matches!(
            schema.get("containerDimensions"),
            Some(SchemaNode::Interior(_))
        ));
        assert!(schema.get("hostContext").is_none());
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let names: Vec<&str> = host_context_schema().iter().map(|(n, _)| n).collect();
        assert_eq!(names.first(), Some(&"toolInfo"));
        assert_eq!(names.get(1), Some(&"theme"));
        assert_eq!(names.last(), Some(&"safeAreaInsets"));
    }

    #[test]
    fn test_dimension_union_groups() {
        let Some(SchemaNode::Interior(dims)) = host_context_schema().get("containerDimensions")
        else {
            panic!("containerDimensions must be interior");
        };
        assert_eq!(dims.union_groups.len(), 2);
        assert_eq!(dims.union_groups[0].one_of, vec!["height", "maxHeight"]);
        assert_eq!(dims.union_groups[1].label, "width");
    }

    #[test]
    fn test_builder_modifiers_respect_variant() {
        let leaf = SchemaNode::leaf(JsonType::String).with_union_group("x", ["a"]);
        assert_eq!(leaf, SchemaNode::leaf(JsonType::String));

        let interior = SchemaNode::interior(Fields::new()).with_enum(["a"]);
        assert_eq!(interior.expected_types(), TypeSet::single(JsonType::Object));
        assert!(!interior.is_optional());
        assert!(interior.optional().is_optional());
    }

    #[test]
    fn test_fields_redeclaration_replaces() {
        let fields = Fields::new()
            .with("a", SchemaNode::leaf(JsonType::String))
            .with("a", SchemaNode::leaf(JsonType::Number));
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields.get("a").map(SchemaNode::expected_types),
            Some(TypeSet::single(JsonType::Number))
        );
    }

    #[test]
    fn test_type_set_serde() {
        let single = TypeSet::single(JsonType::String);
        assert_eq!(serde_json::to_value(&single).unwrap(), json!("string"));

        let union = TypeSet::any_of([JsonType::String, JsonType::Number, JsonType::String]);
        assert!(union.is_union());
        assert_eq!(serde_json::to_value(&union).unwrap(), json!(["string", "number"]));
        assert_eq!(union.to_string(), "string | number");

        let parsed: TypeSet = serde_json::from_value(json!("boolean")).unwrap();
        assert_eq!(parsed, TypeSet::single(JsonType::Boolean));
    }
}
