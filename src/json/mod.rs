//! JSON parsing with miette diagnostics

pub mod diagnostics;

pub use diagnostics::JsonSyntaxError;

use serde::de::DeserializeOwned;

/// Parse JSON text, turning failures into a diagnostic pointing at the source
pub fn parse_json_str<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, JsonSyntaxError> {
    serde_json::from_str(content).map_err(|e| JsonSyntaxError::from_serde_error(&e, content, filename))
}
