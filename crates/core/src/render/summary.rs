//! Summary shape for large results: count, histogram, preview.

use std::collections::HashMap;

use super::format::{display_value, escape_cell, truncate};
use super::table::{plural, render_table};
use crate::query::{QueryKind, QueryResult};

/// Distinct values listed in the histogram.
const HISTOGRAM_TOP: usize = 10;

const HISTOGRAM_VALUE_CHARS: usize = 60;

pub(super) fn render_summary(result: &QueryResult, preview_rows: usize) -> String {
    let total = result.rows.len();
    let mut out = format!("{} {}\n", total, plural(total, "result"));
    if total == 0 {
        return out;
    }

    let (label, counts) = histogram(result);
    out.push_str(&format!("\n## By {}\n\n", label));
    out.push_str("| Value | Count |\n");
    out.push_str("| --- | --- |\n");
    for (value, count) in counts.iter().take(HISTOGRAM_TOP) {
        let value = escape_cell(&truncate(value, HISTOGRAM_VALUE_CHARS));
        out.push_str(&format!("| {} | {} |\n", value, count));
    }
    if counts.len() > HISTOGRAM_TOP {
        let rest: usize = counts[HISTOGRAM_TOP..].iter().map(|(_, n)| n).sum();
        let others = counts.len() - HISTOGRAM_TOP;
        out.push_str(&format!("| ({} other {}) | {} |\n", others, plural(others, "value"), rest));
    }

    let shown = preview_rows.min(total);
    if shown > 0 {
        out.push_str(&format!("\n## First {} of {}\n\n", shown, total));
        out.push_str(&render_table(result, &result.rows[..shown]));
    }
    out
}

/// Counts per distinct value, most frequent first, ties by value.
///
/// Uses the first column, `completed` for TASK results, and the folder when
/// there are no columns.
fn histogram(result: &QueryResult) -> (String, Vec<(String, usize)>) {
    let column = match result.kind {
        QueryKind::Task => result.columns.iter().position(|c| c == "completed"),
        _ if result.columns.is_empty() => None,
        _ => Some(0),
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in &result.rows {
        let key = match column {
            Some(i) => row.values.get(i).map(display_value).unwrap_or_default(),
            None => match row.path.rsplit_once('/') {
                Some((folder, _)) => folder.to_string(),
                None => "/".to_string(),
            },
        };
        *counts.entry(key).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let label = match column {
        Some(i) => result.columns[i].clone(),
        None => "folder".to_string(),
    };
    (label, counts)
}
