//! Table, list and compact shapes.

use super::format::{display_value, escape_cell, table_cell, truncate};
use crate::query::{QueryKind, QueryResult, Row};

/// Longest cell kept by the compact renderer.
const COMPACT_CELL_CHARS: usize = 60;

pub(super) const NO_RESULTS: &str = "No results.\n";

pub(super) fn render_table(result: &QueryResult, rows: &[Row]) -> String {
    if rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = header(result);
    for row in rows {
        out.push_str(&line(&cells(row, None)));
    }
    out
}

pub(super) fn render_list(result: &QueryResult) -> String {
    if result.rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    for row in &result.rows {
        if result.kind == QueryKind::Task {
            out.push_str(&task_line(row));
            continue;
        }
        out.push_str(&format!("- {}", row.path));
        if !row.values.is_empty() {
            let values: Vec<String> = row.values.iter().map(display_value).collect();
            out.push_str(&format!(": {}", values.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// A table with shortened cells that stops once `max_chars` would be exceeded.
pub(super) fn render_compact(result: &QueryResult, max_chars: usize) -> String {
    if result.rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = header(result);
    let mut used = out.chars().count();
    let mut written = 0;

    for row in &result.rows {
        let row_line = line(&cells(row, Some(COMPACT_CELL_CHARS)));
        let cost = row_line.chars().count();
        if used + cost > max_chars {
            break;
        }
        out.push_str(&row_line);
        used += cost;
        written += 1;
    }

    let omitted = result.rows.len() - written;
    if omitted > 0 {
        out.push_str(&format!("... {} more {} omitted\n", omitted, plural(omitted, "row")));
    }
    out
}

pub(super) fn plural(n: usize, word: &str) -> String {
    if n == 1 { word.to_string() } else { format!("{word}s") }
}

fn header(result: &QueryResult) -> String {
    let mut headers = vec!["File".to_string()];
    headers.extend(result.columns.iter().map(|c| escape_cell(c)));

    let mut out = line(&headers);
    out.push_str(&line(&vec!["---".to_string(); headers.len()]));
    out
}

fn cells(row: &Row, limit: Option<usize>) -> Vec<String> {
    let mut cells = vec![escape_cell(&row.path)];
    cells.extend(row.values.iter().map(table_cell));
    if let Some(limit) = limit {
        for cell in &mut cells {
            *cell = truncate(cell, limit);
        }
    }
    cells
}

fn line(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

/// `- [x] text (path:line)` for one TASK row.
fn task_line(row: &Row) -> String {
    let text = row.values.first().map(display_value).unwrap_or_default();
    let done = row.values.get(1).is_some_and(|v| v.is_truthy());
    let location = match row.values.get(2) {
        Some(line) => format!("{}:{}", row.path, display_value(line)),
        None => row.path.clone(),
    };
    format!("- [{}] {} ({})\n", if done { "x" } else { " " }, text, location)
}
