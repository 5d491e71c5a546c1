//! Lenient value coercion at the input boundary.
//!
//! These functions never fail: a value that cannot be interpreted becomes
//! the type-appropriate default.

use serde_json::Value;

/// Coerces a JSON value into a finite number. Unparseable input yields 0.0.
pub fn coerce_numeric(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => parse_numeric_text(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Coerces a JSON value into a boolean. Unrecognized input yields false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && v.is_finite()),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "t"
        ),
        _ => false,
    }
}

/// Maps a JSON value onto a vocabulary index. Unseen values map to index 0.
pub fn coerce_category(value: &Value, vocabulary: &[&str]) -> usize {
    let label = match value {
        Value::String(s) => normalize_label(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return 0,
    };
    vocabulary
        .iter()
        .position(|v| labels_match(v, &label))
        .unwrap_or(0)
}

/// Compares normalized labels ignoring word separators, so `deep_tech`
/// matches `deeptech`.
pub fn labels_match(a: &str, b: &str) -> bool {
    a.chars().filter(|c| *c != '_').eq(b.chars().filter(|c| *c != '_'))
}

/// Lowercases and joins words with underscores: `"Series A"` -> `"series_a"`.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn parse_numeric_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.trim().parse::<f64>().ok()
}
