use serde::{Deserialize, Serialize};

use crate::inference::DEFAULT_MAX_DEPTH;
use crate::render::TypeFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nesting depth past which generation and validation stop descending.
    pub max_depth: usize,
    /// Format used when a type definition is requested without options.
    pub default_format: TypeFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_format: TypeFormat::Multiline,
        }
    }
}
