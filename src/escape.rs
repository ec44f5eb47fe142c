//! Escaping for Cypher string literals and identifiers.

use std::borrow::Cow;

/// Escape a string for use inside a Cypher string literal.
///
/// # Arguments
/// * `s` - The string to escape
/// * `quote_char` - The quote character to escape ('\'' for single-quoted, '"' for double-quoted)
pub fn escape_string_for_quote(s: &str, quote_char: char) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            c if c == quote_char => {
                result.push('\\');
                result.push(c);
            }
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

/// Escape a string for a single-quoted Cypher literal.
#[inline]
pub fn escape_string(s: &str) -> String {
    escape_string_for_quote(s, '\'')
}

/// Render a string as a complete single-quoted Cypher literal.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Whether `s` can be used as a bare identifier (variable, label, property key).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Quote an identifier with backticks when it is not a bare identifier.
pub fn quote_identifier(s: &str) -> Cow<'_, str> {
    if is_identifier(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("`{}`", s.replace('`', "``")))
    }
}
