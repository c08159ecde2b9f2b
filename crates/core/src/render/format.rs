//! Display helpers for field values.

use crate::frontmatter::value::format_date;
use crate::frontmatter::{CIRCULAR_MARKER, FieldValue};

/// Shown in place of a missing value.
pub const PLACEHOLDER: &str = "—";

/// Nesting deeper than this is treated as a reference cycle.
pub const MAX_DEPTH: usize = 32;

/// Format a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Human-readable text for a value. Top-level lists are comma separated.
pub fn display_value(value: &FieldValue) -> String {
    let mut out = String::new();
    match value {
        FieldValue::List(items) => write_items(&mut out, items, 1),
        other => write_value(&mut out, other, 0),
    }
    out
}

/// A value as a table cell: pipes escaped, line breaks flattened.
pub fn table_cell(value: &FieldValue) -> String {
    escape_cell(&display_value(value))
}

pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace("\r\n", " ").replace('\n', " ")
}

/// Shorten to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn write_value(out: &mut String, value: &FieldValue, depth: usize) {
    if depth > MAX_DEPTH {
        out.push_str(CIRCULAR_MARKER);
        return;
    }

    match value {
        FieldValue::Missing => out.push_str(PLACEHOLDER),
        FieldValue::String(s) => out.push_str(s),
        FieldValue::Number(n) => out.push_str(&format_number(*n)),
        FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        FieldValue::Date(d) => out.push_str(&format_date(d)),
        FieldValue::List(items) => {
            out.push('[');
            write_items(out, items, depth + 1);
            out.push(']');
        }
        FieldValue::Mapping(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                write_value(out, value, depth + 1);
            }
            out.push('}');
        }
    }
}

fn write_items(out: &mut String, items: &[FieldValue], depth: usize) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(out, item, depth);
    }
}
