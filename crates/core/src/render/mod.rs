//! Turning query results into text.
//!
//! | mode      | output                                                     |
//! |-----------|------------------------------------------------------------|
//! | `table`   | markdown table with a leading `File` column                |
//! | `list`    | one bullet per row; TASK rows as checklist items           |
//! | `count`   | a single line with the row count                           |
//! | `compact` | table with shortened cells, capped at a character budget   |
//! | `summary` | count, value histogram and a preview table                 |
//! | `smart`   | natural mode below the threshold, `summary` at or above it |
//! | `json`    | the serialised [`QueryResult`]                             |

pub mod format;
mod summary;
mod table;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::query::QueryResult;

pub use format::{PLACEHOLDER, display_value, format_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Table,
    List,
    Count,
    Compact,
    Summary,
    Smart,
    Json,
}

impl RenderMode {
    pub const ALL: [RenderMode; 7] = [
        RenderMode::Table,
        RenderMode::List,
        RenderMode::Count,
        RenderMode::Compact,
        RenderMode::Summary,
        RenderMode::Smart,
        RenderMode::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Table => "table",
            RenderMode::List => "list",
            RenderMode::Count => "count",
            RenderMode::Compact => "compact",
            RenderMode::Summary => "summary",
            RenderMode::Smart => "smart",
            RenderMode::Json => "json",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        RenderMode::ALL.into_iter().find(|m| m.as_str() == lower).ok_or_else(|| {
            let known: Vec<&str> = RenderMode::ALL.iter().map(|m| m.as_str()).collect();
            format!("unknown render mode '{}', expected one of: {}", s, known.join(", "))
        })
    }
}

/// Tunables for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Row count at which `smart` switches to `summary`.
    pub smart_threshold: usize,
    pub compact_max_chars: usize,
    pub summary_preview_rows: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { smart_threshold: 50, compact_max_chars: 4000, summary_preview_rows: 10 }
    }
}

/// The concrete mode `requested` resolves to for this result.
pub fn resolve_mode(
    result: &QueryResult,
    requested: RenderMode,
    options: &RenderOptions,
) -> RenderMode {
    match requested {
        RenderMode::Smart if result.rows.len() >= options.smart_threshold => RenderMode::Summary,
        RenderMode::Smart => result.kind.natural_mode(),
        other => other,
    }
}

/// Render `result` in `mode`. Never fails; failed queries render their error.
pub fn render(result: &QueryResult, mode: RenderMode, options: &RenderOptions) -> String {
    let mode = resolve_mode(result, mode, options);

    if mode == RenderMode::Json {
        let smart = resolve_mode(result, RenderMode::Smart, options);
        let json = if result.render_mode == smart {
            serde_json::to_string_pretty(result)
        } else {
            serde_json::to_string_pretty(&QueryResult { render_mode: smart, ..result.clone() })
        };
        return json
            .unwrap_or_else(|e| format!("{{\"error\": \"cannot serialise result: {e}\"}}"));
    }
    if let Some(error) = &result.error {
        return format!("Error ({}): {}\n", error.kind.as_str(), error.message);
    }

    match mode {
        RenderMode::Table => table::render_table(result, &result.rows),
        RenderMode::List => table::render_list(result),
        RenderMode::Count => {
            format!("{} {}\n", result.rows.len(), table::plural(result.rows.len(), "result"))
        }
        RenderMode::Compact => table::render_compact(result, options.compact_max_chars),
        RenderMode::Summary => summary::render_summary(result, options.summary_preview_rows),
        RenderMode::Smart | RenderMode::Json => unreachable!("resolved above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::FieldValue;
    use crate::query::{QueryError, QueryKind, Row, TASK_COLUMNS};
    use insta::assert_snapshot;

    fn table_result(rows: &[(&str, FieldValue)]) -> QueryResult {
        let mut result = QueryResult::empty(QueryKind::Table);
        result.columns = vec!["status".into()];
        result.rows = rows
            .iter()
            .map(|(path, value)| Row { path: path.to_string(), values: vec![value.clone()] })
            .collect();
        result
    }

    fn statuses(n: usize) -> QueryResult {
        let rows: Vec<(String, FieldValue)> = (0..n)
            .map(|i| {
                let status = if i % 3 == 0 { "done" } else { "open" };
                (format!("notes/n{i:03}.md"), FieldValue::from(status))
            })
            .collect();
        let borrowed: Vec<(&str, FieldValue)> =
            rows.iter().map(|(p, v)| (p.as_str(), v.clone())).collect();
        table_result(&borrowed)
    }

    #[test]
    fn parses_modes() {
        assert_eq!("SMART".parse::<RenderMode>(), Ok(RenderMode::Smart));
        assert_eq!(" json ".parse::<RenderMode>(), Ok(RenderMode::Json));
        assert!("graph".parse::<RenderMode>().unwrap_err().contains("expected one of"));
    }

    #[test]
    fn table_with_placeholder() {
        let result = table_result(&[
            ("a.md", FieldValue::from("open")),
            ("b.md", FieldValue::Missing),
            ("c|d.md", FieldValue::from("🚀 launch")),
        ]);
        assert_snapshot!(render(&result, RenderMode::Table, &RenderOptions::default()), @r"
| File | status |
| --- | --- |
| a.md | open |
| b.md | — |
| c\|d.md | 🚀 launch |
");
    }

    #[test]
    fn list_and_count() {
        let result = table_result(&[("a.md", "open".into()), ("b.md", FieldValue::Missing)]);
        let options = RenderOptions::default();
        assert_eq!(render(&result, RenderMode::List, &options), "- a.md: open\n- b.md: —\n");
        assert_eq!(render(&result, RenderMode::Count, &options), "2 results\n");
    }

    #[test]
    fn task_rows_render_as_checklist() {
        let mut result = QueryResult::empty(QueryKind::Task);
        result.columns = TASK_COLUMNS.iter().map(|c| c.to_string()).collect();
        result.rows = vec![
            Row {
                path: "p.md".into(),
                values: vec!["ship".into(), true.into(), FieldValue::Number(4.0)],
            },
            Row {
                path: "p.md".into(),
                values: vec!["retro".into(), false.into(), FieldValue::Number(5.0)],
            },
        ];
        let out = render(&result, RenderMode::Smart, &RenderOptions::default());
        assert_eq!(out, "- [x] ship (p.md:4)\n- [ ] retro (p.md:5)\n");
    }

    #[test]
    fn smart_switches_to_summary_at_threshold() {
        let options = RenderOptions::default();
        assert_eq!(resolve_mode(&statuses(5), RenderMode::Smart, &options), RenderMode::Table);
        assert_eq!(resolve_mode(&statuses(49), RenderMode::Smart, &options), RenderMode::Table);
        assert_eq!(resolve_mode(&statuses(50), RenderMode::Smart, &options), RenderMode::Summary);

        let small = RenderOptions { smart_threshold: 3, ..RenderOptions::default() };
        assert_eq!(resolve_mode(&statuses(5), RenderMode::Smart, &small), RenderMode::Summary);
        assert_eq!(resolve_mode(&statuses(5), RenderMode::Count, &small), RenderMode::Count);
    }

    #[test]
    fn summary_shows_histogram_and_preview() {
        let options = RenderOptions { summary_preview_rows: 2, ..RenderOptions::default() };
        assert_snapshot!(render(&statuses(200), RenderMode::Smart, &options), @r"
200 results

## By status

| Value | Count |
| --- | --- |
| open | 133 |
| done | 67 |

## First 2 of 200

| File | status |
| --- | --- |
| notes/n000.md | done |
| notes/n001.md | open |
");
    }

    #[test]
    fn compact_respects_budget() {
        let options = RenderOptions { compact_max_chars: 120, ..RenderOptions::default() };
        let out = render(&statuses(20), RenderMode::Compact, &options);
        assert!(out.chars().count() <= 120 + "... 20 more rows omitted\n".len());
        assert!(out.ends_with("more rows omitted\n"));
        assert!(out.starts_with("| File | status |\n| --- | --- |\n"));
    }

    #[test]
    fn errors_render_as_text_and_json() {
        let err = QueryError::Parse(crate::query::ParseError::new("unknown query type", 0));
        let result = QueryResult::failed(QueryKind::Empty, &err);
        let options = RenderOptions::default();

        let text = render(&result, RenderMode::Table, &options);
        assert!(text.starts_with("Error (parse): parse error: unknown query type"));

        let json: serde_json::Value =
            serde_json::from_str(&render(&result, RenderMode::Json, &options)).unwrap();
        assert_eq!(json["error"]["kind"], "parse");
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn json_keeps_missing_as_null() {
        let result = table_result(&[("a.md", FieldValue::Missing), ("b.md", 3.0.into())]);
        let json: serde_json::Value =
            serde_json::from_str(&render(&result, RenderMode::Json, &RenderOptions::default()))
                .unwrap();
        assert!(json["rows"][0]["values"][0].is_null());
        assert_eq!(json["rows"][1]["values"][0], 3);
        assert_eq!(json["render_mode"], "table");
    }

    #[test]
    fn json_reports_smart_resolution() {
        let options = RenderOptions::default();
        let json: serde_json::Value =
            serde_json::from_str(&render(&statuses(60), RenderMode::Json, &options)).unwrap();
        assert_eq!(json["render_mode"], "summary");
    }
}
