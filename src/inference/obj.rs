use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{generate_at, merge};
use crate::ir::SchemaNode;

pub(super) fn generate_object(map: &Map<String, Value>, depth: usize, max_depth: usize) -> SchemaNode {
    SchemaNode::object(
        map.iter()
            .map(|(k, v)| (k.clone(), generate_at(v, depth + 1, max_depth))),
    )
}

/// Keys seen on both sides merge; keys seen on one side only are kept as optional.
pub(super) fn merge_properties(
    a: &BTreeMap<String, SchemaNode>,
    b: &BTreeMap<String, SchemaNode>,
) -> BTreeMap<String, SchemaNode> {
    let mut out = BTreeMap::new();

    for (k, pa) in a {
        let merged = match b.get(k) {
            Some(pb) => merge(pa, pb),
            None => pa.clone().with_optional(true),
        };
        out.insert(k.clone(), merged);
    }
    for (k, pb) in b {
        if !out.contains_key(k) {
            out.insert(k.clone(), pb.clone().with_optional(true));
        }
    }

    out
}
