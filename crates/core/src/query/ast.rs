//! Query syntax tree.

use serde::Serialize;

use crate::render::RenderMode;

/// The leading keyword of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// An empty query string; evaluates to no rows.
    Empty,
    Table,
    List,
    Task,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Empty => "empty",
            QueryKind::Table => "TABLE",
            QueryKind::List => "LIST",
            QueryKind::Task => "TASK",
        }
    }

    /// The render mode a result of this kind reads best in.
    pub fn natural_mode(&self) -> RenderMode {
        match self {
            QueryKind::Table => RenderMode::Table,
            QueryKind::Empty | QueryKind::List | QueryKind::Task => RenderMode::List,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Parsed query. Clause bodies are kept as text and compiled by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAst {
    pub kind: QueryKind,
    /// Field expressions in order, each possibly carrying an `AS alias` suffix.
    pub fields: Vec<String>,
    /// FROM expression, empty when the clause is absent.
    pub from: String,
    pub where_clause: Option<String>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

impl QueryAst {
    pub fn empty() -> Self {
        Self {
            kind: QueryKind::Empty,
            fields: Vec::new(),
            from: String::new(),
            where_clause: None,
            sort: None,
            limit: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == QueryKind::Empty
    }
}

/// A field expression split into the path to resolve and its column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub path: String,
    pub header: String,
}

impl FieldSpec {
    /// Split `path AS alias`; without an alias the header is the path itself.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        match find_alias_keyword(raw) {
            Some((path, alias)) => {
                let alias = alias.trim();
                let alias = unquote(alias).unwrap_or(alias);
                Self { path: path.trim().to_string(), header: alias.to_string() }
            }
            None => Self { path: raw.to_string(), header: raw.to_string() },
        }
    }
}

/// Find the last ` AS ` (any case) outside quotes.
fn find_alias_keyword(raw: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    let mut found = None;
    for (i, c) in raw.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => {
                let rest = &raw[i + c.len_utf8()..];
                if let (Some(keyword), Some(tail)) = (rest.get(..2), rest.get(2..))
                    && keyword.eq_ignore_ascii_case("as")
                    && tail.starts_with(char::is_whitespace)
                    && !tail.trim().is_empty()
                {
                    found = Some((&raw[..i], tail.trim_start()));
                }
            }
            None => {}
        }
    }
    found
}

pub(crate) fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')))
    {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_spec_without_alias() {
        let spec = FieldSpec::from_raw(" status ");
        assert_eq!(spec.path, "status");
        assert_eq!(spec.header, "status");
    }

    #[test]
    fn field_spec_with_alias() {
        let spec = FieldSpec::from_raw("file.mtime AS \"Last Edit\"");
        assert_eq!(spec.path, "file.mtime");
        assert_eq!(spec.header, "Last Edit");

        let spec = FieldSpec::from_raw("due as Deadline");
        assert_eq!(spec.path, "due");
        assert_eq!(spec.header, "Deadline");
    }

    #[test]
    fn alias_inside_quotes_is_ignored() {
        let spec = FieldSpec::from_raw("\"x as y\"");
        assert_eq!(spec.path, "\"x as y\"");
    }

    #[test]
    fn natural_modes() {
        assert_eq!(QueryKind::Table.natural_mode(), RenderMode::Table);
        assert_eq!(QueryKind::Task.natural_mode(), RenderMode::List);
    }
}
