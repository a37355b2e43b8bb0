use serde_json::Value;

use super::{generate_at, merge};
use crate::ir::SchemaNode;

/// Element 0 seeds the item schema; every later element is merged into it.
pub(super) fn generate_array(xs: &[Value], depth: usize, max_depth: usize) -> SchemaNode {
    let items = xs
        .iter()
        .map(|el| generate_at(el, depth + 1, max_depth))
        .reduce(|acc, next| merge(&acc, &next));
    SchemaNode::array(items)
}

pub(super) fn merge_items(a: Option<&SchemaNode>, b: Option<&SchemaNode>) -> Option<Box<SchemaNode>> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(Box::new(x.clone())),
        (Some(x), Some(y)) => Some(Box::new(merge(x, y))),
    }
}
