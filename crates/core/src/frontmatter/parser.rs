//! Frontmatter splitting from markdown documents.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::value::{CIRCULAR_MARKER, FieldValue, Frontmatter};

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("frontmatter must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// Result of splitting frontmatter from markdown.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed frontmatter (if present).
    pub frontmatter: Option<Frontmatter>,
    /// The markdown body (everything after frontmatter).
    pub body: String,
    /// 1-based line on which the body starts in the original text.
    pub body_line_offset: usize,
}

impl ParsedDocument {
    fn without_frontmatter(content: &str) -> Self {
        Self { frontmatter: None, body: content.to_string(), body_line_offset: 1 }
    }
}

/// Parse frontmatter from markdown content.
///
/// Frontmatter is delimited by `---` at the start of the document:
/// ```markdown
/// ---
/// key: value
/// ---
/// # Document content
/// ```
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
    let Some(split) = split(content) else {
        return Ok(ParsedDocument::without_frontmatter(content));
    };

    let frontmatter = if split.yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        parse_yaml_mapping(split.yaml)?
    };

    Ok(split.into_document(frontmatter))
}

/// Parse frontmatter, recovering what it can from malformed YAML.
///
/// When the block as a whole fails to parse, each top-level key is parsed on
/// its own and broken keys are dropped. A key whose value refers to its own
/// anchor (`a: &x [*x]`) is kept with the [`CIRCULAR_MARKER`] string.
pub fn parse_lenient(content: &str) -> ParsedDocument {
    let Some(split) = split(content) else {
        return ParsedDocument::without_frontmatter(content);
    };

    let frontmatter = if split.yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        match parse_yaml_mapping(split.yaml) {
            Ok(fm) => fm,
            Err(e) => {
                tracing::debug!("salvaging frontmatter after error: {}", e);
                salvage_entries(split.yaml)
            }
        }
    };

    split.into_document(frontmatter)
}

struct Split<'a> {
    yaml: &'a str,
    body: &'a str,
    body_line_offset: usize,
}

impl Split<'_> {
    fn into_document(self, frontmatter: Frontmatter) -> ParsedDocument {
        ParsedDocument {
            frontmatter: Some(frontmatter),
            body: self.body.to_string(),
            body_line_offset: self.body_line_offset,
        }
    }
}

/// Locate the frontmatter block and the body after it.
fn split(content: &str) -> Option<Split<'_>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let trimmed = content.trim_start();

    // Check if document starts with frontmatter delimiter
    if !trimmed.starts_with("---") {
        return None;
    }

    let leading_lines = content[..content.len() - trimmed.len()].matches('\n').count();
    let after_first = &trimmed[3..];

    // `----` or `--- text` is a thematic break, not a fence
    let after_newline =
        after_first.strip_prefix('\n').or_else(|| after_first.strip_prefix("\r\n"))?;

    // No closing ---, treat as no frontmatter
    let (end_pos, yaml_lines) = find_closing_delimiter(after_newline)?;

    // Skip closing --- and the rest of its line
    let after_closing = &after_newline[end_pos..];
    let body = match after_closing.find('\n') {
        Some(nl) => &after_closing[nl + 1..],
        None => "",
    };

    Some(Split {
        yaml: &after_newline[..end_pos],
        body,
        // opening fence + yaml lines + closing fence
        body_line_offset: leading_lines + yaml_lines + 3,
    })
}

fn parse_yaml_mapping(yaml_content: &str) -> Result<Frontmatter, FrontmatterParseError> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml_content)?;
    match FieldValue::from_yaml(&value) {
        FieldValue::Mapping(fields) => Ok(Frontmatter { fields }),
        FieldValue::Missing => Ok(Frontmatter::default()),
        other => Err(FrontmatterParseError::NotAMapping(other.type_name())),
    }
}

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([A-Za-z0-9_-]+)").unwrap());

static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([A-Za-z0-9_-]+)").unwrap());

fn salvage_entries(yaml: &str) -> Frontmatter {
    let mut entries: Vec<String> = Vec::new();
    for line in yaml.lines() {
        let starts_entry = !line.starts_with([' ', '\t', '#', '-']) && !line.trim().is_empty();
        if starts_entry {
            entries.push(line.to_string());
        } else if let Some(entry) = entries.last_mut() {
            entry.push('\n');
            entry.push_str(line);
        }
    }

    let mut frontmatter = Frontmatter::default();
    for entry in entries {
        match parse_yaml_mapping(&entry) {
            Ok(fm) => frontmatter.fields.extend(fm.fields),
            Err(_) if is_self_referential(&entry) => {
                if let Some(key) = entry_key(&entry) {
                    frontmatter
                        .fields
                        .insert(key, FieldValue::String(CIRCULAR_MARKER.to_string()));
                }
            }
            Err(e) => tracing::debug!("dropping frontmatter entry: {}", e),
        }
    }
    frontmatter
}

fn is_self_referential(entry: &str) -> bool {
    let anchors: Vec<&str> =
        ANCHOR_RE.captures_iter(entry).filter_map(|c| c.get(1)).map(|m| m.as_str()).collect();
    ALIAS_RE
        .captures_iter(entry)
        .filter_map(|c| c.get(1))
        .any(|alias| anchors.contains(&alias.as_str()))
}

fn entry_key(entry: &str) -> Option<String> {
    let (key, _) = entry.split_once(':')?;
    let key = key.trim().trim_matches(|c| c == '"' || c == '\'');
    (!key.is_empty()).then(|| key.to_string())
}

/// Find the byte position of the closing `---` line and the number of lines before it.
fn find_closing_delimiter(content: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    for (i, line) in content.split_inclusive('\n').enumerate() {
        if line.trim() == "---" || line.trim() == "..." {
            return Some((pos, i));
        }
        pos += line.len();
    }
    None
}
