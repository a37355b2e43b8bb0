//! Structural schema inference and drift detection for JSON responses.
//!
//! Observe JSON values, infer one generalized [`SchemaNode`] for them, keep
//! schemas by name, and validate later values against them. Drift is split
//! into errors (breaking: kind mismatches, missing required keys) and
//! warnings (additive: keys the schema has never seen).
//!
//! ```
//! use json_drift::{DriftEngine, TypeDefinitionOptions};
//! use serde_json::json;
//!
//! let engine = DriftEngine::new();
//! engine.generate_type_definition(&json!({"id": 1, "name": "a"}), "user", TypeDefinitionOptions::default())?;
//!
//! let result = engine.validate_against_cached_schema(r#"{"id": 2, "role": "admin"}"#, "user")?;
//! assert_eq!(result.error_messages(), vec!["Error at name: expected string, got missing"]);
//! assert_eq!(result.warnings.len(), 1);
//! # Ok::<(), json_drift::EngineError>(())
//! ```
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod inference;
pub mod input;
pub mod ir;
pub mod render;
pub mod validate;

pub use cache::SchemaCache;
pub use config::EngineConfig;
pub use engine::{DriftEngine, SchemaComparison, TypeDefinitionOptions};
pub use error::{EngineError, Result};
pub use inference::{generate, merge};
pub use input::JsonInput;
pub use ir::{Kind, SchemaNode, Ty};
pub use render::{render, render_definition, TypeFormat};
pub use validate::{validate, ValidationError, ValidationResult, ValidationWarning};
