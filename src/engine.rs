//! Public operation surface: generation, caching, validation and comparison.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::SchemaCache;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::inference::generate_bounded;
use crate::input::JsonInput;
use crate::ir::SchemaNode;
use crate::render::{render_definition, TypeFormat};
use crate::validate::{validate_bounded, ValidationError, ValidationResult, ValidationWarning};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinitionOptions {
    /// Falls back to [`EngineConfig::default_format`].
    pub format: Option<TypeFormat>,
}

impl TypeDefinitionOptions {
    pub fn format(format: TypeFormat) -> Self {
        Self { format: Some(format) }
    }
}

/// Outcome of checking sample B against the schema inferred from sample A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaComparison {
    pub is_compatible: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub schema_a: SchemaNode,
    pub schema_b: SchemaNode,
}

#[derive(Debug, Default)]
pub struct DriftEngine {
    config: EngineConfig,
    cache: SchemaCache,
}

impl DriftEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config, cache: SchemaCache::new() }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse if needed and generate a schema, without touching the cache.
    pub fn generate_schema<'a>(&self, value: impl Into<JsonInput<'a>>) -> Result<SchemaNode> {
        let value = value.into().into_value()?;
        Ok(generate_bounded(&value, self.config.max_depth))
    }

    /// Generate a schema, cache it under `name`, and render it.
    pub fn generate_type_definition<'a>(
        &self,
        value: impl Into<JsonInput<'a>>,
        name: &str,
        options: TypeDefinitionOptions,
    ) -> Result<String> {
        let schema = self.generate_schema(value)?;
        let format = options.format.unwrap_or(self.config.default_format);
        let rendered = render_definition(name, &schema, format);
        self.cache.insert(name, schema);
        Ok(rendered)
    }

    /// Validate `candidate` against a schema generated from `reference`.
    ///
    /// Never fails: bad input on either side is reported as a single error
    /// at the root path.
    pub fn validate_response<'a, 'b>(
        &self,
        candidate: impl Into<JsonInput<'a>>,
        reference: impl Into<JsonInput<'b>>,
    ) -> ValidationResult {
        let run = || -> Result<ValidationResult> {
            let schema = self.generate_schema(reference)?;
            let candidate = candidate.into().into_value()?;
            Ok(validate_bounded(&candidate, &schema, self.config.max_depth))
        };
        run().unwrap_or_else(|err| {
            warn!(error = %err, "response validation could not run");
            ValidationResult::from_failure("valid JSON", err.to_string())
        })
    }

    pub fn validate_against_cached_schema<'a>(
        &self,
        candidate: impl Into<JsonInput<'a>>,
        name: &str,
    ) -> Result<ValidationResult> {
        let schema = self
            .cache
            .get(name)
            .ok_or_else(|| EngineError::NoCachedSchema { name: name.to_string() })?;
        let candidate = candidate.into().into_value()?;
        let result = validate_bounded(&candidate, &schema, self.config.max_depth);
        debug!(
            name,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated against cached schema"
        );
        Ok(result)
    }

    /// B is compatible with A when it validates against A's schema without
    /// errors. Warnings (additions) do not affect compatibility.
    pub fn compare_schemas<'a, 'b>(
        &self,
        sample_a: impl Into<JsonInput<'a>>,
        sample_b: impl Into<JsonInput<'b>>,
    ) -> Result<SchemaComparison> {
        let value_a = sample_a.into().into_value()?;
        let value_b = sample_b.into().into_value()?;
        let schema_a = generate_bounded(&value_a, self.config.max_depth);
        let schema_b = generate_bounded(&value_b, self.config.max_depth);
        let ValidationResult { errors, warnings } =
            validate_bounded(&value_b, &schema_a, self.config.max_depth);
        Ok(SchemaComparison {
            is_compatible: errors.is_empty(),
            errors,
            warnings,
            schema_a,
            schema_b,
        })
    }

    pub fn get_cached_schema(&self, name: &str) -> Option<SchemaNode> {
        self.cache.get(name)
    }

    /// Store a schema obtained elsewhere, e.g. loaded from disk.
    pub fn cache_schema(&self, name: impl Into<String>, schema: SchemaNode) {
        self.cache.insert(name, schema);
    }

    pub fn remove_cached_schema(&self, name: &str) -> Option<SchemaNode> {
        self.cache.remove(name)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn list_cached_schema_names(&self) -> Vec<String> {
        self.cache.names()
    }
}
