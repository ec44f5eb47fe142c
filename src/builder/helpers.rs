//! Helper utilities for inspecting built queries.
//!
//! Nothing here is used to build executable queries; these render parameters
//! back into text for logs and debugging output.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use super::Params;
use crate::escape::{quote_identifier, quote_string};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder pattern is valid")
});

/// Render a parameter value as a Cypher literal.
pub fn format_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_string(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote_identifier(k), format_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Substitute every `$name` in `script` that has a value in `params`.
///
/// Unknown placeholders are left untouched.
pub fn interpolate(script: &str, params: &Params) -> String {
    PLACEHOLDER
        .replace_all(script, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => format_literal(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Format a parameter map as debug output.
///
/// Useful for logging query parameters during development.
pub fn format_params_debug(params: &Params) -> String {
    let items: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, format_literal(v)))
        .collect();
    format!("{{{}}}", items.join(", "))
}
