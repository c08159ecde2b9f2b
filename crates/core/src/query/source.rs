//! FROM clause: folder and tag sources joined by `OR`.

use super::error::ParseError;
use super::lexer::{TokenKind, tokenize};
use crate::vault::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Folder prefix, matched by whole path components.
    Folder(String),
    /// Exact tag, without the `#`.
    Tag(String),
}

/// A compiled FROM clause. No sources means every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FromClause {
    pub sources: Vec<Source>,
}

impl FromClause {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input)?;
        let mut sources = Vec::new();
        let mut tokens = tokens.into_iter().peekable();

        while let Some(token) = tokens.next() {
            let source = match token.kind {
                TokenKind::Str(folder) => Source::Folder(folder.trim_matches('/').to_string()),
                TokenKind::Tag(tag) => Source::Tag(tag),
                other => {
                    return Err(ParseError::new(
                        format!(
                            "expected quoted folder or #tag in FROM, found {}",
                            other.describe()
                        ),
                        token.position,
                    ));
                }
            };
            sources.push(source);

            match tokens.next() {
                None => break,
                Some(t) if t.kind == TokenKind::Or => {
                    if tokens.peek().is_none() {
                        return Err(ParseError::new("expected source after OR", input.len()));
                    }
                }
                Some(t) => {
                    return Err(ParseError::new(
                        format!("only OR may join FROM sources, found {}", t.kind.describe()),
                        t.position,
                    ));
                }
            }
        }

        Ok(Self { sources })
    }

    pub fn is_all(&self) -> bool {
        self.sources.is_empty()
    }

    /// Cheap pre-filter on the path alone, before content is loaded.
    ///
    /// Returns `true` whenever a tag source could still match.
    pub fn may_match_path(&self, path: &str, base: &str) -> bool {
        self.is_all()
            || self.sources.iter().any(|source| match source {
                Source::Folder(folder) => in_folder(path, base, folder),
                Source::Tag(_) => true,
            })
    }

    pub fn matches(&self, doc: &Document, base: &str) -> bool {
        self.is_all()
            || self.sources.iter().any(|source| match source {
                Source::Folder(folder) => in_folder(&doc.path, base, folder),
                Source::Tag(tag) => doc.has_tag(tag),
            })
    }
}

/// Folder sources are relative to `base` when it is non-empty.
fn in_folder(path: &str, base: &str, folder: &str) -> bool {
    let base = base.trim_matches('/');
    let prefix = match (base.is_empty(), folder.is_empty()) {
        (true, _) => folder.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{folder}"),
    };

    prefix.is_empty()
        || path
            .strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
