//! Query string to [`QueryAst`].
//!
//! ```text
//! TABLE [field [AS alias], ...] | LIST [field] | TASK
//!     [FROM <source> [OR <source>]...]
//!     [WHERE <expr>]
//!     [SORT [BY] <field> [ASC|DESC]]
//!     [LIMIT <n>]
//! ```
//!
//! Clause keywords are case-insensitive, reserved at the top level, and must
//! appear in the order above. FROM and WHERE bodies are validated here but
//! kept as text on the AST.
//!
//! An alias that is itself a clause keyword must be quoted
//! (`TABLE status AS "Limit"`); unquoted it starts that clause.

use super::ast::{FieldSpec, QueryAst, QueryKind, SortDirection, SortSpec};
use super::error::ParseError;
use super::expr::parse_expr;
use super::source::FromClause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Keyword {
    From,
    Where,
    Sort,
    Limit,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "from" => Some(Keyword::From),
            "where" => Some(Keyword::Where),
            "sort" => Some(Keyword::Sort),
            "limit" => Some(Keyword::Limit),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Sort => "SORT",
            Keyword::Limit => "LIMIT",
        }
    }
}

/// A clause keyword found at the top level of the query.
struct ClauseMark {
    keyword: Keyword,
    /// Offset of the keyword itself.
    start: usize,
    /// Offset just past the keyword.
    body_start: usize,
}

/// Parse a query. An empty (or all-whitespace) string is the empty query.
pub fn parse(query: &str) -> Result<QueryAst, ParseError> {
    let Some(kind_start) = query.find(|c: char| !c.is_whitespace()) else {
        return Ok(QueryAst::empty());
    };

    let kind_word = leading_word(&query[kind_start..]);
    let kind = match kind_word.to_ascii_lowercase().as_str() {
        "table" => QueryKind::Table,
        "list" => QueryKind::List,
        "task" => QueryKind::Task,
        _ => {
            return Err(ParseError::new(
                format!("unknown query type '{kind_word}', expected TABLE, LIST or TASK"),
                kind_start,
            ));
        }
    };
    let head_start = kind_start + kind_word.len();

    let marks = find_clauses(query, head_start)?;
    let head_end = marks.first().map_or(query.len(), |m| m.start);
    let mut ast = QueryAst { kind, ..QueryAst::empty() };
    ast.fields = parse_fields(kind, &query[head_start..head_end], head_start)?;

    for (i, mark) in marks.iter().enumerate() {
        let body_end = marks.get(i + 1).map_or(query.len(), |next| next.start);
        let raw = &query[mark.body_start..body_end];
        let body = raw.trim();
        if body.is_empty() {
            return Err(ParseError::new(
                format!("{} clause is empty", mark.keyword.as_str()),
                mark.start,
            ));
        }

        match mark.keyword {
            Keyword::From => {
                FromClause::parse(raw).map_err(|e| e.offset(mark.body_start))?;
                ast.from = body.to_string();
            }
            Keyword::Where => {
                parse_expr(raw).map_err(|e| e.offset(mark.body_start))?;
                ast.where_clause = Some(body.to_string());
            }
            Keyword::Sort => ast.sort = Some(parse_sort(raw, mark.body_start)?),
            Keyword::Limit => {
                let limit = body.parse::<usize>().map_err(|_| {
                    ParseError::new(
                        format!("LIMIT expects a non-negative integer, found '{body}'"),
                        mark.body_start + (raw.len() - raw.trim_start().len()),
                    )
                })?;
                ast.limit = Some(limit);
            }
        }
    }

    Ok(ast)
}

fn leading_word(s: &str) -> &str {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    &s[..end]
}

/// Locate clause keywords outside quotes and parentheses, checking their order.
fn find_clauses(query: &str, from: usize) -> Result<Vec<ClauseMark>, ParseError> {
    let mut marks: Vec<ClauseMark> = Vec::new();
    let mut prev_is_space = true;

    for (i, c, top_level) in scan(query).filter(|(i, _, _)| *i >= from) {
        if top_level && prev_is_space && c.is_ascii_alphabetic() {
            let word = leading_word(&query[i..]);
            if let Some(keyword) = Keyword::from_word(word) {
                if let Some(last) = marks.last()
                    && last.keyword >= keyword
                {
                    let message = if last.keyword == keyword {
                        format!("duplicate {} clause", keyword.as_str())
                    } else {
                        format!(
                            "{} clause must come before {}",
                            keyword.as_str(),
                            last.keyword.as_str()
                        )
                    };
                    return Err(ParseError::new(message, i));
                }
                marks.push(ClauseMark { keyword, start: i, body_start: i + word.len() });
            }
        }
        prev_is_space = c.is_whitespace();
    }

    Ok(marks)
}

/// Characters with their offsets; the flag is false inside quotes or parentheses.
fn scan(s: &str) -> impl Iterator<Item = (usize, char, bool)> + '_ {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;

    s.char_indices().map(move |(i, c)| {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            return (i, c, false);
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => return (i, c, depth == 0),
        }
        (i, c, false)
    })
}

fn parse_fields(kind: QueryKind, head: &str, offset: usize) -> Result<Vec<String>, ParseError> {
    let mut fields = Vec::new();
    let mut segment_start = 0;
    let commas = scan(head).filter(|&(_, c, top)| top && c == ',').map(|(i, _, _)| i);

    for end in commas.chain(std::iter::once(head.len())) {
        let raw = &head[segment_start..end];
        let field = raw.trim();
        let position = offset + segment_start + (raw.len() - raw.trim_start().len());
        segment_start = end + 1;

        if field.is_empty() {
            if head.trim().is_empty() {
                break;
            }
            return Err(ParseError::new("empty field in field list", position));
        }
        let spec = FieldSpec::from_raw(field);
        if !is_field_path(&spec.path) {
            return Err(ParseError::new(format!("invalid field '{}'", spec.path), position));
        }
        fields.push(field.to_string());
    }

    match kind {
        QueryKind::List if fields.len() > 1 => {
            Err(ParseError::new("LIST takes at most one field", offset))
        }
        QueryKind::Task if !fields.is_empty() => {
            Err(ParseError::new("TASK does not take fields", offset))
        }
        _ => Ok(fields),
    }
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('.')
        && !path.ends_with('.')
        && path.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}

fn parse_sort(raw: &str, offset: usize) -> Result<SortSpec, ParseError> {
    let words: Vec<(usize, &str)> = raw
        .split_whitespace()
        .map(|w| (offset + (w.as_ptr() as usize - raw.as_ptr() as usize), w))
        .collect();
    let words = match words.as_slice() {
        [(_, by), rest @ ..] if by.eq_ignore_ascii_case("by") && !rest.is_empty() => rest,
        all => all,
    };

    let field = match words.first() {
        Some(&(_, field)) if is_field_path(field) => field,
        Some(&(pos, field)) => {
            return Err(ParseError::new(format!("invalid sort field '{field}'"), pos));
        }
        None => return Err(ParseError::new("SORT needs a field", offset)),
    };

    let direction = match words.get(1) {
        None => SortDirection::Asc,
        Some((_, dir)) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
        Some((_, dir)) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        Some(&(pos, other)) => {
            return Err(ParseError::new(
                format!("expected ASC or DESC after sort field, found '{other}'"),
                pos,
            ));
        }
    };
    if let Some(&(pos, extra)) = words.get(2) {
        return Err(ParseError::new(format!("unexpected '{extra}' in SORT"), pos));
    }

    Ok(SortSpec { field: field.to_string(), direction })
}
