//! Payload selection for CLI inputs: a JSON Pointer and/or a jq filter that
//! pulls the interesting part out of a response envelope.
use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct Selector {
    pub json_pointer: Option<String>,
    pub jq_expr: Option<String>,
}

impl Selector {
    /// Pointer first, then jq. A jq filter may yield any number of payloads.
    pub fn apply(&self, value: Value) -> Result<Vec<Value>> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(ptr) => value
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer `{ptr}` matched nothing"))?,
        };
        match self.jq_expr.as_deref() {
            None => Ok(vec![value]),
            Some(expr) => run_jaq(expr, &value)?
                .iter()
                .map(|out| {
                    serde_json::from_str::<Value>(out)
                        .with_context(|| format!("jq output is not JSON: {out}"))
                })
                .collect(),
        }
    }
}

/// Run `filter_src` over `input`, returning each output as JSON text.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<String>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let rendered: Result<Vec<String>> = outputs
        .map(|item| item.map(|v| v.to_string()).map_err(|e| anyhow!("jq runtime error: {e:?}")))
        .collect();
    rendered
}

fn format_parse_errors(
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> anyhow::Error {
    let msg = errs
        .iter()
        .map(|(file, err)| format!("jq parse error: {err:?} in `{}`", file.code))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow!(msg)
}

fn format_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> anyhow::Error {
    let msg = errs
        .iter()
        .flat_map(|(file, list)| {
            list.iter()
                .map(move |(name, undef)| format!("jq: undefined `{name}`: {undef:?} in `{}`", file.code))
        })
        .collect::<Vec<_>>()
        .join("\n");
    anyhow!(msg)
}
