//! Structural schema tree shared by inference, validation and rendering.
//!
//! A [`SchemaNode`] is a closed tagged variant ([`Ty`]) plus an `optional`
//! flag. Children only exist on the variants that own them, so an `object`
//! can never carry `items` and a `union` can never carry `properties`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind label of a node or of a concrete JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Object,
    Array,
    Union,
}

impl Kind {
    /// Kind of a parsed JSON value. Never `Undefined` or `Union`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Union => "union",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a node. Serialized with a `kind` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Ty {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Object {
        #[serde(default)]
        properties: BTreeMap<String, SchemaNode>,
    },
    Array {
        /// `None` when only empty arrays were observed: any element is accepted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Box<SchemaNode>>,
    },
    Union {
        alternatives: BTreeSet<Kind>,
    },
}

impl Ty {
    pub fn kind(&self) -> Kind {
        match self {
            Ty::String => Kind::String,
            Ty::Number => Kind::Number,
            Ty::Boolean => Kind::Boolean,
            Ty::Null => Kind::Null,
            Ty::Undefined => Kind::Undefined,
            Ty::Object { .. } => Kind::Object,
            Ty::Array { .. } => Kind::Array,
            Ty::Union { .. } => Kind::Union,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(flatten)]
    pub ty: Ty,
    /// Value may be absent or null across observations.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl SchemaNode {
    pub fn new(ty: Ty) -> Self {
        Self { ty, optional: false }
    }

    pub fn null() -> Self { Self::new(Ty::Null) }
    pub fn undefined() -> Self { Self::new(Ty::Undefined) }

    pub fn object<I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (String, SchemaNode)>,
    {
        Self::new(Ty::Object { properties: properties.into_iter().collect() })
    }

    pub fn array(items: Option<SchemaNode>) -> Self {
        Self::new(Ty::Array { items: items.map(Box::new) })
    }

    pub fn union<I>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = Kind>,
    {
        Self::new(Ty::Union { alternatives: alternatives.into_iter().collect() })
    }

    pub fn kind(&self) -> Kind {
        self.ty.kind()
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, SchemaNode>> {
        match &self.ty {
            Ty::Object { properties } => Some(properties),
            _ => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties().and_then(|props| props.get(name))
    }

    pub fn items(&self) -> Option<&SchemaNode> {
        match &self.ty {
            Ty::Array { items } => items.as_deref(),
            _ => None,
        }
    }

    pub fn alternatives(&self) -> Option<&BTreeSet<Kind>> {
        match &self.ty {
            Ty::Union { alternatives } => Some(alternatives),
            _ => None,
        }
    }

    /// Type description used in validation errors, e.g. `number | null`.
    pub fn describe(&self) -> String {
        let base = match &self.ty {
            Ty::Union { alternatives } => alternatives
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(" | "),
            ty => ty.kind().to_string(),
        };
        if self.optional && !matches!(self.ty, Ty::Null) {
            format!("{base} | null")
        } else {
            base
        }
    }
}

impl From<Ty> for SchemaNode {
    fn from(ty: Ty) -> Self {
        Self::new(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_kind_tag() {
        let node = SchemaNode::object([
            ("id".to_string(), SchemaNode::new(Ty::Number)),
            ("tags".to_string(), SchemaNode::array(None).with_optional(true)),
        ]);
        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out, json!({
            "kind": "object",
            "properties": {
                "id": { "kind": "number" },
                "tags": { "kind": "array", "optional": true }
            }
        }));
        let back: SchemaNode = serde_json::from_value(out).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn describe_marks_optional_and_unions() {
        assert_eq!(SchemaNode::new(Ty::String).describe(), "string");
        assert_eq!(SchemaNode::new(Ty::String).with_optional(true).describe(), "string | null");
        let u = SchemaNode::union([Kind::String, Kind::Number]);
        assert_eq!(u.describe(), "string | number");
    }

    #[test]
    fn optional_null_is_not_doubled() {
        assert_eq!(SchemaNode::null().with_optional(true).describe(), "null");
    }

    #[test]
    fn kind_of_values() {
        assert_eq!(Kind::of(&json!(null)), Kind::Null);
        assert_eq!(Kind::of(&json!(1.5)), Kind::Number);
        assert_eq!(Kind::of(&json!([])), Kind::Array);
        assert_eq!(Kind::of(&json!({})), Kind::Object);
    }
}
