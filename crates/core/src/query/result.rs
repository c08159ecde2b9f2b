//! Query results.

use serde::Serialize;

use super::ast::QueryKind;
use super::error::{ErrorKind, QueryError};
use crate::frontmatter::FieldValue;
use crate::render::RenderMode;

/// One result row: the document it came from and one value per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub path: String,
    pub values: Vec<FieldValue>,
}

/// A failure surfaced to the caller instead of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFailure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub kind: QueryKind,
    /// Column headers, excluding the implicit file column.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// What `smart` rendering resolves to for this result: the kind's
    /// natural mode, or `summary` for large results.
    pub render_mode: RenderMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryFailure>,
    /// Documents dropped because they could not be read.
    pub skipped: usize,
}

impl QueryResult {
    pub fn empty(kind: QueryKind) -> Self {
        Self {
            kind,
            columns: Vec::new(),
            rows: Vec::new(),
            render_mode: kind.natural_mode(),
            error: None,
            skipped: 0,
        }
    }

    pub fn failed(kind: QueryKind, error: &QueryError) -> Self {
        Self {
            error: Some(QueryFailure { kind: error.kind(), message: error.to_string() }),
            ..Self::empty(kind)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&FieldValue> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.values.get(index)
    }

    /// Row paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.path.as_str())
    }
}
