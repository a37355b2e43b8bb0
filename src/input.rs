//! Engine inputs: already-parsed values or raw JSON text.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::{EngineError, Result};

#[derive(Debug, Clone)]
pub enum JsonInput<'a> {
    Parsed(Cow<'a, Value>),
    Text(Cow<'a, str>),
}

impl<'a> JsonInput<'a> {
    /// Parse text inputs; parsed inputs pass through without copying.
    pub fn into_value(self) -> Result<Cow<'a, Value>> {
        match self {
            JsonInput::Parsed(value) => Ok(value),
            JsonInput::Text(src) => parse_json(&src).map(Cow::Owned),
        }
    }
}

impl<'a> From<&'a Value> for JsonInput<'a> {
    fn from(value: &'a Value) -> Self { JsonInput::Parsed(Cow::Borrowed(value)) }
}

impl From<Value> for JsonInput<'_> {
    fn from(value: Value) -> Self { JsonInput::Parsed(Cow::Owned(value)) }
}

impl<'a> From<&'a str> for JsonInput<'a> {
    fn from(src: &'a str) -> Self { JsonInput::Text(Cow::Borrowed(src)) }
}

impl<'a> From<&'a String> for JsonInput<'a> {
    fn from(src: &'a String) -> Self { JsonInput::Text(Cow::Borrowed(src.as_str())) }
}

impl From<String> for JsonInput<'_> {
    fn from(src: String) -> Self { JsonInput::Text(Cow::Owned(src)) }
}

/// Parse JSON text, reporting the JSON path where parsing stopped.
pub fn parse_json(src: &str) -> Result<Value> {
    let de = &mut serde_json::Deserializer::from_str(src);
    let value = serde_path_to_error::deserialize::<_, Value>(&mut *de).map_err(|err| {
        let path = err.path().to_string();
        EngineError::InvalidJson { path, source: err.into_inner() }
    })?;
    de.end().map_err(|source| EngineError::InvalidJson { path: ".".to_string(), source })?;
    Ok(value)
}
