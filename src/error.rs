//! Usage errors. Structural findings are data, see [`crate::validate`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid JSON at {path}: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no cached schema named `{name}`")]
    NoCachedSchema { name: String },
}
