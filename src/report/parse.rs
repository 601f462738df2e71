//! Lenient field parsing shared by every adapter.
//!
//! Malformed input never fails here: it degrades to a zero or empty
//! sentinel and logs a warning.

use serde_json::Value;
use tracing::warn;

use crate::grade::Grade;

use super::types::OverallGrade;

/// Longest leading run of digits with at most one decimal point, with an
/// optional sign.
///
/// Leading whitespace is skipped and trailing text such as unit suffixes is
/// ignored, so "3.2 mil" gives `Some(3.2)`. Returns `None` when no digits
/// lead the string or the digit run overflows `f64`.
pub fn try_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut seen_point = false;
    let number: String = digits
        .chars()
        .take_while(|c| {
            if c.is_ascii_digit() {
                true
            } else if *c == '.' && !seen_point {
                seen_point = true;
                true
            } else {
                false
            }
        })
        .collect();

    if !number.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    number
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| sign * n)
}

/// Like [`try_leading_number`], but unparsable input yields 0.0.
pub fn leading_number(text: &str) -> f64 {
    match try_leading_number(text) {
        Some(value) => value,
        None => {
            warn!("Could not parse a number from '{}', using 0.0", text);
            0.0
        }
    }
}

/// Parse a composite overall grade: `value/aperture/reference`.
///
/// A "DPM" marker anywhere in the string is dropped before splitting.
/// Malformed strings yield a 0.0 (F) grade with empty aperture and
/// reference; the original text is always kept.
pub fn parse_overall_grade(original: &str) -> OverallGrade {
    let cleaned = original.replace("DPM", "");
    let parts: Vec<&str> = cleaned
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() < 3 {
        warn!("Malformed overall grade '{}', grading as 0.0", original);
        return OverallGrade {
            grade: Grade::new(0.0),
            original: original.to_string(),
            aperture: String::new(),
            reference: String::new(),
        };
    }

    OverallGrade {
        grade: Grade::new(leading_number(parts[0])),
        original: original.to_string(),
        aperture: parts[1].to_string(),
        reference: parts[2].to_string(),
    }
}

/// Walk a dotted path ("grading.iso15415.modulation", "toolList.0.name")
/// through nested JSON objects and arrays.
pub fn value_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .filter(|v| !v.is_null())
}

/// Numeric JSON field, accepting numbers or numeric strings.
pub fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => Some(leading_number(s)),
        _ => None,
    }
}

/// Text JSON field, rendering numbers and booleans as text.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split GS1 element string "(01)123(10)AB" into ["(01)123", "(10)AB"].
pub fn split_gs1_elements(data: &str) -> Vec<String> {
    data.split('(')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("({}", s))
        .collect()
}
