//! Human-readable type definitions for a [`SchemaNode`].
//!
//! Output is TypeScript-flavoured and meant for display or export only:
//!
//! ```text
//! type User = {
//!   id: number;
//!   nickname?: string | null;
//!   tags: string[];
//! };
//! ```
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ir::{Kind, SchemaNode, Ty};

const INDENT: &str = "  ";

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TypeFormat {
    #[default]
    Multiline,
    Inline,
}

/// Render the type expression of `schema` alone.
pub fn render(schema: &SchemaNode, format: TypeFormat) -> String {
    let mut out = String::new();
    write_node(&mut out, schema, format, 0);
    out
}

/// Render `type <Name> = <body>;` for a cache name such as `user-list`.
pub fn render_definition(name: &str, schema: &SchemaNode, format: TypeFormat) -> String {
    format!("type {} = {};", type_name(name), render(schema, format))
}

/// PascalCase identifier for an arbitrary name. Falls back to `Root`.
pub fn type_name(name: &str) -> String {
    let mut out: String = WORD
        .find_iter(name)
        .map(|m| {
            let mut chars = m.as_str().chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    if out.is_empty() {
        return "Root".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn property_key(key: &str) -> String {
    if IDENT.is_match(key) {
        key.to_string()
    } else {
        serde_json::Value::from(key).to_string()
    }
}

fn write_node(out: &mut String, node: &SchemaNode, format: TypeFormat, level: usize) {
    write_ty(out, &node.ty, format, level);
    if node.optional && is_primitive(&node.ty) {
        out.push_str(" | null");
    }
}

fn write_ty(out: &mut String, ty: &Ty, format: TypeFormat, level: usize) {
    match ty {
        Ty::String => out.push_str("string"),
        Ty::Number => out.push_str("number"),
        Ty::Boolean => out.push_str("boolean"),
        Ty::Null => out.push_str("null"),
        Ty::Undefined => out.push_str("undefined"),
        Ty::Union { alternatives } => {
            let arms = alternatives
                .iter()
                .map(|k| match k {
                    Kind::Array => "unknown[]",
                    k => k.as_str(),
                })
                .collect::<Vec<_>>();
            out.push_str(&arms.join(" | "));
        }
        Ty::Array { items: None } => out.push_str("unknown[]"),
        Ty::Array { items: Some(items) } => {
            let wrap = matches!(items.ty, Ty::Union { .. })
                || (items.optional && is_primitive(&items.ty));
            if wrap { out.push('('); }
            write_node(out, items, format, level);
            if wrap { out.push(')'); }
            out.push_str("[]");
        }
        Ty::Object { properties } if properties.is_empty() => out.push_str("{}"),
        Ty::Object { properties } => match format {
            TypeFormat::Inline => {
                out.push_str("{ ");
                let fields = properties
                    .iter()
                    .map(|(key, prop)| {
                        let mut field = field_head(key, prop);
                        write_node(&mut field, prop, format, level);
                        field
                    })
                    .collect::<Vec<_>>();
                out.push_str(&fields.join("; "));
                out.push_str(" }");
            }
            TypeFormat::Multiline => {
                out.push_str("{\n");
                for (key, prop) in properties {
                    out.push_str(&INDENT.repeat(level + 1));
                    out.push_str(&field_head(key, prop));
                    write_node(out, prop, format, level + 1);
                    out.push_str(";\n");
                }
                out.push_str(&INDENT.repeat(level));
                out.push('}');
            }
        },
    }
}

fn field_head(key: &str, prop: &SchemaNode) -> String {
    let marker = if prop.optional { "?" } else { "" };
    format!("{}{marker}: ", property_key(key))
}

/// Kinds that gain an explicit `| null` when optional.
fn is_primitive(ty: &Ty) -> bool {
    match ty {
        Ty::String | Ty::Number | Ty::Boolean | Ty::Union { .. } => true,
        Ty::Null | Ty::Undefined | Ty::Object { .. } | Ty::Array { .. } => false,
    }
}
