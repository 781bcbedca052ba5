//! JSON error diagnostics with source spans

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// JSON syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(vinspect::json::syntax))]
pub struct JsonSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl JsonSyntaxError {
    /// Create a syntax error from a serde_json error
    pub fn from_serde_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let offset = line_col_to_offset(source, err.line().max(1), err.column().max(1));
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert line/column (1-based) to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let body = text.trim_end_matches('\n');
            let col = column.saturating_sub(1).min(body.len());
            return line_start + col;
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("trailing comma") {
        return Some("Remove the comma after the last item in the list or object.".to_string());
    }

    if msg_lower.contains("eof while parsing") {
        return Some("The file ends early - check for a missing closing ']' or '}'.".to_string());
    }

    if msg_lower.contains("key must be a string") {
        return Some("Object keys must be double-quoted strings: \"key\": value".to_string());
    }

    if msg_lower.contains("expected `,` or") {
        return Some("Separate items with commas: [\"a\", \"b\"]".to_string());
    }

    if msg_lower.contains("invalid length") {
        return Some("Parts are written as [name, level, {relations}].".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("trailing comma at line 3 column 5").is_some());
        assert!(generate_help("EOF while parsing an object").is_some());
        assert!(generate_help("key must be a string").is_some());
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_from_serde_error() {
        let source = "{\n  \"processes\": [\"A\",]\n}";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let diag = JsonSyntaxError::from_serde_error(&err, source, "data.json");
        assert!(diag.message().contains("trailing comma"));
        assert!(diag.help.is_some());
    }
}
