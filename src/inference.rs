//! Schema generation and merging.
//!
//! Generate a [`SchemaNode`] per JSON value, then fold nodes together with
//! [`merge`] to get one generalized schema for a stream of structurally
//! similar samples.
//!
//! Merge rules, by precedence:
//! - `null` paired with anything else yields the other side, marked optional.
//! - `undefined` carries no information and yields the other side unchanged.
//! - Any other kind mismatch yields a `union` of kind labels. Object/array
//!   structure is dropped at that point; unions only ever hold labels.
//! - Same kinds merge structurally: object keys are unioned (one-sided keys
//!   become optional), array items are merged, union alternatives are unioned.
pub mod arr;
pub mod obj;

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{trace, warn};

use crate::ir::{Kind, SchemaNode, Ty};

// ------------------------------- Policy ---------------------------------- //

/// Nesting bound for generation and validation. Matches the recursion limit
/// serde_json applies when parsing text.
pub const DEFAULT_MAX_DEPTH: usize = 128;

// ------------------------------ Generate --------------------------------- //

pub fn generate(value: &Value) -> SchemaNode {
    generate_bounded(value, DEFAULT_MAX_DEPTH)
}

/// Like [`generate`], but containers deeper than `max_depth` keep their kind
/// and lose their children.
pub fn generate_bounded(value: &Value, max_depth: usize) -> SchemaNode {
    generate_at(value, 0, max_depth)
}

fn generate_at(value: &Value, depth: usize, max_depth: usize) -> SchemaNode {
    match value {
        Value::Null => SchemaNode::null(),
        Value::Bool(_) => SchemaNode::new(Ty::Boolean),
        Value::Number(_) => SchemaNode::new(Ty::Number),
        Value::String(_) => SchemaNode::new(Ty::String),
        Value::Array(_) | Value::Object(_) if depth >= max_depth => {
            warn!(depth, "max depth reached; children of this node are not inferred");
            match value {
                Value::Array(_) => SchemaNode::array(None),
                _ => SchemaNode::object([]),
            }
        }
        Value::Array(xs) => arr::generate_array(xs, depth, max_depth),
        Value::Object(map) => obj::generate_object(map, depth, max_depth),
    }
}

/// Generate one node per value and fold them together. `None` for an empty
/// iterator.
pub fn infer_from_values<'a, I>(values: I) -> Option<SchemaNode>
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .map(generate)
        .reduce(|acc, next| merge(&acc, &next))
}

// -------------------------------- Merge ---------------------------------- //

pub fn merge(a: &SchemaNode, b: &SchemaNode) -> SchemaNode {
    trace!(a = %a.kind(), b = %b.kind(), "merge");
    match (&a.ty, &b.ty) {
        (Ty::Null, Ty::Null) => SchemaNode::null().with_optional(a.optional || b.optional),
        (Ty::Null, _) => b.clone().with_optional(true),
        (_, Ty::Null) => a.clone().with_optional(true),
        (Ty::Undefined, Ty::Undefined) => {
            SchemaNode::undefined().with_optional(a.optional || b.optional)
        }
        (Ty::Undefined, _) => b.clone(),
        (_, Ty::Undefined) => a.clone(),
        (Ty::Object { properties: pa }, Ty::Object { properties: pb }) => {
            SchemaNode::new(Ty::Object { properties: obj::merge_properties(pa, pb) })
                .with_optional(a.optional || b.optional)
        }
        (Ty::Array { items: ia }, Ty::Array { items: ib }) => {
            SchemaNode::new(Ty::Array { items: arr::merge_items(ia.as_deref(), ib.as_deref()) })
                .with_optional(a.optional || b.optional)
        }
        (Ty::String, Ty::String) | (Ty::Number, Ty::Number) | (Ty::Boolean, Ty::Boolean) => {
            SchemaNode::new(a.ty.clone()).with_optional(a.optional || b.optional)
        }
        _ => {
            let alternatives = &kind_labels(a) | &kind_labels(b);
            SchemaNode::new(Ty::Union { alternatives }).with_optional(a.optional || b.optional)
        }
    }
}

/// Labels a node contributes to a union. Existing unions are flattened.
fn kind_labels(node: &SchemaNode) -> BTreeSet<Kind> {
    match &node.ty {
        Ty::Union { alternatives } => alternatives.clone(),
        ty => BTreeSet::from([ty.kind()]),
    }
}

// ------------------------------- Tests ------------------------------------ //
