//! Schema validation with detailed error reporting

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::warn;

use crate::schema::registry::SchemaRegistry;

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed: {summary}")]
#[diagnostic(code(vinspect::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// Validator for inspection data files
pub struct DataValidator {
    compiled: Option<JsonValidator>,
}

impl DataValidator {
    /// Compile the data schema from the registry
    pub fn new(registry: &SchemaRegistry) -> Self {
        let compiled = registry
            .data_schema()
            .and_then(|text| serde_json::from_str::<JsonValue>(&text).ok())
            .and_then(|schema| match validator_for(&schema) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(error = %e, "data schema failed to compile; skipping schema checks");
                    None
                }
            });
        Self { compiled }
    }

    /// Whether a schema is available to check against
    pub fn is_active(&self) -> bool {
        self.compiled.is_some()
    }

    /// Check an already-parsed document, collecting every violation
    pub fn validate(
        &self,
        value: &JsonValue,
        content: &str,
        filename: &str,
    ) -> Result<(), ValidationError> {
        let Some(schema) = &self.compiled else {
            return Ok(());
        };

        let violations: Vec<SchemaViolation> = schema
            .iter_errors(value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

impl Default for DataValidator {
    fn default() -> Self {
        Self::new(&SchemaRegistry::default())
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error, &path);

    let span = find_path_span(content, &path);

    SchemaViolation::new(message, hint, span, help)
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", prop_str, path)
        }
        ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        ValidationErrorKind::Enum { options } => {
            format!(
                "Invalid value at {}: must be one of: {}",
                path,
                format_enum_options(options)
            )
        }
        ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        ValidationErrorKind::Maximum { limit } => {
            format!("Value at {} is too large: maximum {}", path, limit)
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

/// Format enum options as a string
fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Generate a short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "required field missing".to_string(),
        ValidationErrorKind::Type { .. } => "wrong type".to_string(),
        ValidationErrorKind::Enum { .. } => "invalid value".to_string(),
        ValidationErrorKind::Minimum { .. } | ValidationErrorKind::Maximum { .. } => {
            "out of range".to_string()
        }
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field".to_string(),
        _ => "validation error".to_string(),
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError, path: &str) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field", prop_str))
        }
        ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        ValidationErrorKind::Type { .. } if path.starts_with("/catalogs/") => {
            Some("Parts are written as [name, level, {relations}]".to_string())
        }
        ValidationErrorKind::Type { kind } => Some(format!("Expected value of type: {:?}", kind)),
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' field or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown fields or check spelling".to_string())
            }
        }
        _ => None,
    }
}

/// Find the span for a JSON pointer in JSON content
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    // Array indices have no key of their own; walk back to the nearest key
    for key in parts.iter().rev() {
        if key.parse::<usize>().is_ok() {
            continue;
        }
        if let Some(span) = find_key_span(content, key) {
            return span;
        }
    }

    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span of a quoted key in JSON content
fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let quoted = format!("\"{}\"", key);

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if let Some(pos) = line.find(&quoted) {
            let rest = line[pos + quoted.len()..].trim_start();
            if rest.starts_with(':') {
                let body = line.trim_end_matches(['\n', '\r']);
                return Some((offset + pos, body.len() - pos).into());
            }
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(content: &str) -> Result<(), ValidationError> {
        let value: JsonValue = serde_json::from_str(content).unwrap();
        DataValidator::default().validate(&value, content, "data.json")
    }

    #[test]
    fn test_validator_creation() {
        assert!(DataValidator::default().is_active());
    }

    #[test]
    fn test_valid_minimal_document() {
        let json = r#"{
  "processes": ["CLEAN"],
  "catalogs": {"V6": {"A": ["Case", "1", {"includedProcesses": ["CLEAN"]}]}},
  "questionnaires": {"V6": {"exterior": {"Case cracked?": {"parts": ["A"]}}}},
  "devices": [{"version": "V6", "serialRanges": [[1, 10]], "catalog": "V6", "questionnaire": "V6"}]
}"#;
        assert!(check(json).is_ok(), "{:?}", check(json));
    }

    #[test]
    fn test_missing_required_field() {
        let json = r#"{
  "processes": [],
  "catalogs": {},
  "questionnaires": {}
}"#;
        let err = check(json).unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().contains("devices"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{
  "processes": [],
  "catalogs": {},
  "questionnaires": {},
  "devices": [],
  "colour": "blue"
}"#;
        let err = check(json).unwrap_err();
        assert!(err.violations()[0].message().contains("colour"));
    }

    #[test]
    fn test_find_key_span() {
        let content = "{\n  \"catalogs\": {\n    \"V6\": {}\n  }\n}";
        let span = find_key_span(content, "V6").unwrap();
        assert_eq!(span.offset(), content.find("\"V6\"").unwrap());
        assert!(find_key_span(content, "missing").is_none());
    }

    #[test]
    fn test_find_path_span_skips_indices() {
        let content = "{\n  \"devices\": [\n    {}\n  ]\n}";
        let span = find_path_span(content, "/devices/0");
        assert_eq!(span.offset(), content.find("\"devices\"").unwrap());
    }
}
