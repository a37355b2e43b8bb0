//! Structural validation of a value against a [`SchemaNode`].
//!
//! Findings are accumulated over the whole tree. Errors are breaking
//! (kind mismatch, missing required key); warnings are additive drift
//! (keys the schema has never seen).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::inference::DEFAULT_MAX_DEPTH;
use crate::ir::{Kind, SchemaNode, Ty};

pub const MISSING: &str = "missing";
pub const EXTRA_FIELD_MESSAGE: &str = "extra field not present in reference schema";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub expected: String,
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error at {}: expected {}, got {}",
            display_path(&self.path),
            self.expected,
            self.actual
        )
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning at {}: {}", display_path(&self.path), self.message)
    }
}

impl ValidationResult {
    /// Single-error result for failures that happen before any comparison.
    pub fn from_failure(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            errors: vec![ValidationError {
                path: String::new(),
                expected: expected.into(),
                actual: actual.into(),
                value: None,
            }],
            warnings: Vec::new(),
        }
    }

    /// No breaking findings. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

// ------------------------------ Validate --------------------------------- //

pub fn validate(value: &Value, schema: &SchemaNode) -> ValidationResult {
    validate_bounded(value, schema, DEFAULT_MAX_DEPTH)
}

/// Like [`validate`], but nothing below `max_depth` is inspected.
pub fn validate_bounded(value: &Value, schema: &SchemaNode, max_depth: usize) -> ValidationResult {
    let mut walker = Walker { max_depth, out: ValidationResult::default() };
    walker.visit(value, schema, "", 0);
    walker.out
}

struct Walker {
    max_depth: usize,
    out: ValidationResult,
}

impl Walker {
    fn mismatch(&mut self, path: &str, schema: &SchemaNode, value: &Value) {
        self.out.errors.push(ValidationError {
            path: path.to_string(),
            expected: schema.describe(),
            actual: Kind::of(value).to_string(),
            value: Some(value.clone()),
        });
    }

    fn visit(&mut self, value: &Value, schema: &SchemaNode, path: &str, depth: usize) {
        if value.is_null() && schema.optional {
            return;
        }
        match (&schema.ty, value) {
            (Ty::Union { alternatives }, _) => {
                if !alternatives.contains(&Kind::of(value)) {
                    self.mismatch(path, schema, value);
                }
            }
            (Ty::Object { properties }, Value::Object(map)) => {
                if depth < self.max_depth {
                    self.visit_object(map, properties, path, depth);
                }
            }
            (Ty::Array { items }, Value::Array(xs)) => {
                if let Some(items) = items.as_deref()
                    && depth < self.max_depth
                {
                    for (i, el) in xs.iter().enumerate() {
                        self.visit(el, items, &format!("{path}[{i}]"), depth + 1);
                    }
                }
            }
            (ty, value) => {
                if ty.kind() != Kind::of(value) {
                    self.mismatch(path, schema, value);
                }
            }
        }
    }

    fn visit_object(
        &mut self,
        map: &Map<String, Value>,
        properties: &BTreeMap<String, SchemaNode>,
        path: &str,
        depth: usize,
    ) {
        for (key, prop) in properties {
            if !map.contains_key(key) && !prop.optional {
                self.out.errors.push(ValidationError {
                    path: join_key(path, key),
                    expected: prop.describe(),
                    actual: MISSING.to_string(),
                    value: None,
                });
            }
        }
        for (key, field) in map {
            let child = join_key(path, key);
            match properties.get(key) {
                Some(prop) => self.visit(field, prop, &child, depth + 1),
                None => self.out.warnings.push(ValidationWarning {
                    path: child,
                    message: EXTRA_FIELD_MESSAGE.to_string(),
                    value: Some(field.clone()),
                }),
            }
        }
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() { key.to_string() } else { format!("{path}.{key}") }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{generate, merge};
    use serde_json::json;

    #[test]
    fn matching_shape_is_clean() {
        let schema = generate(&json!({"a": 1, "b": "x"}));
        let r = validate(&json!({"a": 2, "b": "y"}), &schema);
        assert!(r.errors.is_empty());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn extra_field_is_a_warning() {
        let schema = generate(&json!({"a": 1}));
        let r = validate(&json!({"a": 1, "b": 2}), &schema);
        assert!(r.is_valid());
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].path, "b");
        assert_eq!(r.warnings[0].value, Some(json!(2)));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let schema = generate(&json!({"a": 1, "b": "x"}));
        let r = validate(&json!({"a": 1}), &schema);
        assert_eq!(r.errors.len(), 1);
        let e = &r.errors[0];
        assert_eq!(e.path, "b");
        assert_eq!(e.expected, "string");
        assert_eq!(e.actual, "missing");
        assert_eq!(e.value, None);
    }

    #[test]
    fn missing_optional_field_is_fine() {
        let schema = generate(&json!([{"a": 1, "b": 2}, {"a": 3}]));
        let r = validate(&json!({"a": 1}), schema.items().unwrap());
        assert!(r.is_valid());
    }

    #[test]
    fn null_accepted_for_optional_schema() {
        let schema = generate(&json!([{"a": 1}, {"a": null}]));
        let r = validate(&json!({"a": null}), schema.items().unwrap());
        assert!(r.is_valid());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn null_rejected_for_required_schema() {
        let schema = generate(&json!({"a": 1}));
        let r = validate(&json!({"a": null}), &schema);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].expected, "number");
        assert_eq!(r.errors[0].actual, "null");
    }

    #[test]
    fn union_checks_membership_only() {
        let schema = generate(&json!([{"a": 1}, {"a": "x"}]));
        let items = schema.items().unwrap();
        assert!(validate(&json!({"a": "y"}), items).is_valid());
        let r = validate(&json!({"a": true}), items);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].path, "a");
        assert_eq!(r.errors[0].actual, "boolean");
    }

    #[test]
    fn union_of_container_labels_is_not_descended() {
        let schema = generate(&json!([{"a": 1}, 3]));
        let r = validate(&json!([{"zzz": true}, "s"]), &schema);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].path, "[1]");
        assert_eq!(r.errors[0].expected, "number | object");
        assert_eq!(r.errors[0].actual, "string");
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn optional_null_expectation_is_plain_null() {
        let schema = generate(&json!([{"a": null}, {}]));
        let r = validate(&json!({"a": 5}), schema.items().unwrap());
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].expected, "null");
        assert_eq!(r.errors[0].actual, "number");
    }

    #[test]
    fn optional_union_accepts_null() {
        let schema = generate(&json!([1, "x", null]));
        assert!(validate(&json!([null, 2, "z"]), &schema).is_valid());
    }

    #[test]
    fn kind_mismatch_describes_optional_expectation() {
        let schema = generate(&json!([{"a": 1}, {"a": null}]));
        let r = validate(&json!({"a": "x"}), schema.items().unwrap());
        assert_eq!(r.errors[0].expected, "number | null");
    }

    #[test]
    fn mismatch_stops_descent() {
        let schema = generate(&json!({"user": {"id": 1, "name": "a"}}));
        let r = validate(&json!({"user": [1, 2]}), &schema);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].path, "user");
        assert_eq!(r.errors[0].expected, "object");
        assert_eq!(r.errors[0].actual, "array");
    }

    #[test]
    fn array_elements_are_addressed_by_index() {
        let schema = generate(&json!({"user": {"addresses": [{"zip": "1"}]}}));
        let value = json!({"user": {"addresses": [{"zip": "2"}, {"zip": "3"}, {"zip": 4}]}});
        let r = validate(&value, &schema);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].path, "user.addresses[2].zip");
        assert_eq!(r.errors[0].value, Some(json!(4)));
    }

    #[test]
    fn root_array_paths_start_with_index() {
        let schema = generate(&json!([1]));
        let r = validate(&json!([1, "x"]), &schema);
        assert_eq!(r.errors[0].path, "[1]");
    }

    #[test]
    fn element_count_is_never_checked() {
        let schema = generate(&json!([1, 2, 3]));
        assert!(validate(&json!([]), &schema).is_valid());
        assert!(validate(&json!([4, 5, 6, 7, 8]), &schema).is_valid());
    }

    #[test]
    fn open_items_accept_any_element() {
        let schema = generate(&json!({"tags": []}));
        assert!(validate(&json!({"tags": [1, "x", {"y": null}]}), &schema).is_valid());
    }

    #[test]
    fn findings_accumulate() {
        let schema = generate(&json!({"a": 1, "b": "x", "c": true}));
        let r = validate(&json!({"a": "1", "d": 0, "e": 1}), &schema);
        assert_eq!(r.errors.len(), 3);
        assert_eq!(r.warnings.len(), 2);
    }

    #[test]
    fn additive_optional_property_never_breaks() {
        let s1 = generate(&json!({"a": 1}));
        let s2 = merge(&s1, &generate(&json!({"a": 2, "extra": "x"})));
        assert!(s2.property("extra").unwrap().optional);
        assert!(validate(&json!({"a": 5}), &s2).is_valid());
    }

    #[test]
    fn classification_ignores_merge_order() {
        let a = generate(&json!({"a": 1, "b": [1], "c": null}));
        let b = generate(&json!({"a": "x", "d": true}));
        let sample = json!({"a": false, "b": ["q"], "z": 1});
        assert_eq!(validate(&sample, &merge(&a, &b)), validate(&sample, &merge(&b, &a)));
    }

    #[test]
    fn messages_are_formatted() {
        let schema = generate(&json!({"a": 1, "b": "x"}));
        let r = validate(&json!({"b": "x", "c": 1}), &schema);
        assert_eq!(r.error_messages(), vec!["Error at a: expected number, got missing"]);
        assert_eq!(
            r.warning_messages(),
            vec!["Warning at c: extra field not present in reference schema"]
        );
        let root = validate(&json!(1), &generate(&json!("x")));
        assert_eq!(root.error_messages(), vec!["Error at <root>: expected string, got number"]);
    }

    #[test]
    fn depth_bound_stops_inspection() {
        let schema = generate(&json!({"a": {"b": 1}}));
        let r = validate_bounded(&json!({"a": {"b": "x"}}), &schema, 1);
        assert!(r.is_valid());
    }
}
