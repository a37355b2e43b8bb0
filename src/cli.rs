//! CLI: infer → (types | schema), validate, compare, check
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::{json, Value};

use json_drift::inference::{generate_bounded, merge, DEFAULT_MAX_DEPTH};
use json_drift::input::parse_json;
use json_drift::render::render_definition;
use json_drift::{DriftEngine, EngineConfig, SchemaNode, TypeFormat, ValidationResult};

use crate::jq_exec::Selector;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer structure from JSON responses and check later responses for structural drift
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// stop inferring/validating below this nesting depth
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// log engine activity to stderr (RUST_LOG also works)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// merge all inputs into one schema and print it as a type definition or as JSON
    Infer(InferOut),
    /// validate a candidate response against a reference response
    Validate(ValidateArgs),
    /// check whether response B is compatible with the shape of response A
    Compare(CompareArgs),
    /// validate inputs against a schema saved with `infer --emit schema`
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// rendered type definition
    Types,
    /// serialized schema tree, loadable by `check`
    Schema,
}

#[derive(clap::Parser, Debug)]
struct InferOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// type name (also the cache name)
    #[arg(long, default_value = "root")]
    name: String,

    #[arg(long, value_enum, default_value_t = TypeFormat::Multiline)]
    format: TypeFormat,

    #[arg(long, value_enum, default_value_t = Emit::Types)]
    emit: Emit,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ValidateArgs {
    /// response the schema is inferred from
    #[arg(long)]
    reference: PathBuf,

    /// response to validate
    #[arg(long)]
    candidate: PathBuf,

    /// print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Parser, Debug)]
struct CompareArgs {
    sample_a: PathBuf,
    sample_b: PathBuf,

    /// print the comparison (including both schemas) as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckArgs {
    #[command(flatten)]
    input_settings: InputSettings,

    /// schema file written by `infer --emit schema`
    #[arg(long)]
    schema: PathBuf,

    /// print results as JSON
    #[arg(long)]
    json: bool,
}

/// One selected document from one input file.
#[derive(Debug, Clone)]
struct Payload {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn selector(&self) -> Selector {
        Selector {
            json_pointer: self.json_pointer.clone(),
            jq_expr: self.jq_expr.clone(),
        }
    }

    /// Read, parse and select every input. Files are processed in parallel;
    /// payloads come back in input order.
    fn load(&self) -> Result<Vec<Payload>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let selector = self.selector();
        let per_file = source_paths
            .par_iter()
            .map(|path| load_file(path, &selector))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }
}

fn load_file(path: &Path, selector: &Selector) -> Result<Vec<Payload>> {
    let source_path_str = path.to_string_lossy().to_string();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source file ({source_path_str})"))?;
    let json_value = parse_json(&source)
        .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
    let selected = selector
        .apply(json_value)
        .with_context(|| format!("failed to select payload in ({source_path_str})"))?;
    let fan_out = selected.len() > 1;
    Ok(selected
        .into_iter()
        .enumerate()
        .map(|(i, value)| Payload {
            source: if fan_out { format!("{source_path_str}#{i}") } else { source_path_str.clone() },
            value,
        })
        .collect())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_or_print(out: Option<&PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    fn engine(&self) -> DriftEngine {
        DriftEngine::with_config(EngineConfig {
            max_depth: self.max_depth,
            ..EngineConfig::default()
        })
    }

    /// Exit code 0 when nothing breaking was found, 1 otherwise.
    pub fn run(&self) -> Result<ExitCode> {
        let engine = self.engine();
        match &self.cmd {
            Command::Infer(target) => {
                let payloads = target.input_settings.load()?;
                let schemas = payloads
                    .par_iter()
                    .map(|p| generate_bounded(&p.value, self.max_depth))
                    .collect::<Vec<_>>();
                let Some(schema) = schemas.into_iter().reduce(|acc, next| merge(&acc, &next)) else {
                    bail!("inputs produced no JSON documents");
                };
                let text = match target.emit {
                    Emit::Types => render_definition(&target.name, &schema, target.format),
                    Emit::Schema => serde_json::to_string_pretty(&schema)?,
                };
                write_or_print(target.out.as_ref(), &text)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Validate(target) => {
                let reference = read_text(&target.reference)?;
                let candidate = read_text(&target.candidate)?;
                let result = engine.validate_response(&candidate, &reference);
                let label = target.candidate.display().to_string();
                if target.json {
                    println!("{}", serde_json::to_string_pretty(&report_json(&label, &result))?);
                } else {
                    print_report(&label, &result);
                }
                Ok(exit_for(result.is_valid()))
            }
            Command::Compare(target) => {
                let a = read_text(&target.sample_a)?;
                let b = read_text(&target.sample_b)?;
                let cmp = engine.compare_schemas(&a, &b)?;
                if target.json {
                    println!("{}", serde_json::to_string_pretty(&cmp)?);
                } else {
                    let result = ValidationResult { errors: cmp.errors, warnings: cmp.warnings };
                    print_report(&target.sample_b.display().to_string(), &result);
                    let verdict = if cmp.is_compatible { "compatible".green() } else { "incompatible".red() };
                    println!("{}", verdict.bold());
                }
                Ok(exit_for(cmp.is_compatible))
            }
            Command::Check(target) => {
                let schema_src = read_text(&target.schema)?;
                let schema: SchemaNode = serde_json::from_str(&schema_src)
                    .with_context(|| format!("{} is not a saved schema", target.schema.display()))?;
                let name = target.schema.display().to_string();
                engine.cache_schema(name.clone(), schema);

                let mut all_valid = true;
                let mut reports = Vec::new();
                for payload in target.input_settings.load()? {
                    let result = engine.validate_against_cached_schema(&payload.value, &name)?;
                    all_valid &= result.is_valid();
                    if target.json {
                        reports.push(report_json(&payload.source, &result));
                    } else {
                        print_report(&payload.source, &result);
                    }
                }
                if target.json {
                    println!("{}", serde_json::to_string_pretty(&reports)?);
                }
                Ok(exit_for(all_valid))
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn exit_for(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::from(1) }
}

fn report_json(source: &str, result: &ValidationResult) -> Value {
    let mut messages = result.error_messages();
    messages.extend(result.warning_messages());
    json!({
        "source": source,
        "valid": result.is_valid(),
        "errors": result.errors,
        "warnings": result.warnings,
        "messages": messages,
    })
}

fn print_report(source: &str, result: &ValidationResult) {
    let status = if !result.is_valid() {
        "drift".red().bold()
    } else if !result.warnings.is_empty() {
        "additions".yellow().bold()
    } else {
        "ok".green().bold()
    };
    println!(
        "{status} {source} ({} errors, {} warnings)",
        result.errors.len(),
        result.warnings.len()
    );
    for msg in result.error_messages() {
        println!("  {}", msg.red());
    }
    for msg in result.warning_messages() {
        println!("  {}", msg.yellow());
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
            }
            if out.len() == before {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn run_cli(args: &[&str]) -> String {
        let cli = CommandLineInterface::try_parse_from(std::iter::once("json-drift").chain(args.iter().copied()))
            .unwrap();
        format!("{:?}", cli.run().unwrap())
    }

    fn ok() -> String {
        format!("{:?}", ExitCode::SUCCESS)
    }

    fn drift() -> String {
        format!("{:?}", ExitCode::from(1))
    }

    fn arg(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[test]
    fn validate_exit_code_follows_drift() {
        let dir = tempfile::tempdir().unwrap();
        let reference = arg(&write(dir.path(), "ref.json", r#"{"id": 1, "name": "a"}"#));
        let clean = arg(&write(dir.path(), "clean.json", r#"{"id": 2, "name": "b", "extra": true}"#));
        let drifted = arg(&write(dir.path(), "drifted.json", r#"{"id": "2"}"#));
        assert_eq!(run_cli(&["validate", "--reference", &reference, "--candidate", &clean]), ok());
        assert_eq!(
            run_cli(&["validate", "--json", "--reference", &reference, "--candidate", &drifted]),
            drift()
        );
    }

    #[test]
    fn compare_exit_code_follows_compatibility() {
        let dir = tempfile::tempdir().unwrap();
        let a = arg(&write(dir.path(), "a.json", r#"{"id": 1, "tags": ["x"]}"#));
        let compatible = arg(&write(dir.path(), "b.json", r#"{"id": 7, "tags": [], "new": null}"#));
        let incompatible = arg(&write(dir.path(), "c.json", r#"{"id": 7, "tags": [1]}"#));
        assert_eq!(run_cli(&["compare", &a, &compatible]), ok());
        assert_eq!(run_cli(&["compare", "--json", &a, &incompatible]), drift());
    }

    #[test]
    fn saved_schema_round_trips_through_check() {
        let dir = tempfile::tempdir().unwrap();
        let s1 = arg(&write(dir.path(), "s1.json", r#"{"id": 1, "nick": "a"}"#));
        let s2 = arg(&write(dir.path(), "s2.json", r#"{"id": 2}"#));
        let schema_path = dir.path().join("out").join("schema.json");
        let schema = arg(&schema_path);
        assert_eq!(
            run_cli(&["infer", "--emit", "schema", "-o", &schema, "-i", &s1, &s2]),
            ok()
        );
        let saved: SchemaNode = serde_json::from_str(&std::fs::read_to_string(&schema_path).unwrap()).unwrap();
        assert!(saved.property("nick").unwrap().optional);

        let good = arg(&write(dir.path(), "good.json", r#"{"id": 3}"#));
        let bad = arg(&write(dir.path(), "bad.json", r#"{"id": "3", "nick": "b"}"#));
        assert_eq!(run_cli(&["check", "--schema", &schema, "-i", &good]), ok());
        assert_eq!(run_cli(&["check", "--json", "--schema", &schema, "-i", &good, &bad]), drift());
    }

    #[test]
    fn infer_types_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = arg(&write(dir.path(), "in.json", r#"{"user_id": 1}"#));
        let out_path = dir.path().join("types.ts");
        let out = arg(&out_path);
        assert_eq!(
            run_cli(&["infer", "--name", "user", "--format", "inline", "-o", &out, "-i", &input]),
            ok()
        );
        assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "type User = { user_id: number };");
    }

    #[test]
    fn globs_and_literals_resolve() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", "{}");
        write(dir.path(), "b.json", "{}");
        let literal = dir.path().join("c.json").to_string_lossy().to_string();
        let pattern = dir.path().join("*.json").to_string_lossy().to_string();
        let paths = resolve_file_path_patterns([pattern, literal]).unwrap();
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn empty_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.json").to_string_lossy().to_string();
        assert!(resolve_file_path_patterns([pattern]).is_err());
    }

    #[test]
    fn loads_and_fans_out_payloads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.json", r#"{"results": [{"id": 1}, {"id": 2}]}"#);
        let b = write(dir.path(), "b.json", r#"{"results": [{"id": 3}]}"#);
        let settings = InputSettings {
            json_pointer: Some("/results".into()),
            jq_expr: Some(".[]".into()),
            input: vec![a.to_string_lossy().into(), b.to_string_lossy().into()],
        };
        let payloads = settings.load().unwrap();
        let ids = payloads.iter().map(|p| p.value["id"].clone()).collect::<Vec<_>>();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
        assert!(payloads[0].source.ends_with("a.json#0"));
        assert!(payloads[2].source.ends_with("b.json"));
    }

    #[test]
    fn malformed_input_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.json", "{");
        let err = load_file(&bad, &Selector::default()).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn report_json_includes_messages() {
        let engine = DriftEngine::new();
        let result = engine.validate_response(&json!({"b": 1}), &json!({"a": 1}));
        let report = report_json("x", &result);
        assert_eq!(report["valid"], json!(false));
        assert_eq!(report["messages"].as_array().unwrap().len(), 2);
    }
}
