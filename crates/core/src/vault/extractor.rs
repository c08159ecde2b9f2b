//! Note content extraction: headings, links, tags and tasks.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};
use regex::Regex;

use crate::frontmatter::{FieldValue, Frontmatter};

/// A checklist item found in a note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Task text without the checkbox.
    pub text: String,
    /// Whether the box is ticked (`[x]` or `[X]`).
    pub completed: bool,
    /// 1-based line number in the original file.
    pub line: usize,
}

// Regex patterns for link extraction
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Matches [[target]] or [[target|alias]]
    // Also handles [[target#section]] and [[target#section|alias]]
    Regex::new(r"\[\[([^\]|#]*)(?:#[^\]|]*)?(?:\|[^\]]+)?\]\]").unwrap()
});

static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)\s]+)\)").unwrap());

static INLINE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(,])#([\p{L}\p{N}_/-]+)").unwrap());

static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]*`").unwrap());

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+\[([ xX])\]\s+(.*)$").unwrap());

/// Frontmatter fields that reference other notes.
const REFERENCE_FIELDS: &[&str] = &["project", "parent", "related", "up", "blocks"];

/// Extract heading texts in document order.
pub fn extract_headings(body: &str) -> Vec<String> {
    let arena = Arena::new();
    let root = parse_document(&arena, body, &parse_options());

    root.descendants()
        .filter(|node| matches!(node.data.borrow().value, NodeValue::Heading(_)))
        .map(collect_text)
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}

/// Extract every note the document points at, body links and frontmatter references.
pub fn extract_links(body: &str, frontmatter: &Frontmatter) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    for line in content_lines(body).map(|(_, line)| line) {
        for cap in WIKILINK_RE.captures_iter(line) {
            let target = cap.get(1).map_or("", |m| m.as_str()).trim();
            if !target.is_empty() {
                links.insert(target.to_string());
            }
        }

        for cap in MARKDOWN_LINK_RE.captures_iter(line) {
            // Skip images
            if cap.get(1).is_some_and(|m| !m.as_str().is_empty()) {
                continue;
            }
            let url = cap.get(3).map_or("", |m| m.as_str());
            if let Some(target) = local_link_target(url) {
                links.insert(target);
            }
        }
    }

    for field in REFERENCE_FIELDS {
        collect_reference(frontmatter.get_path(field), &mut links);
    }

    links
}

/// Extract tags from the `tags`/`tag` frontmatter fields and inline `#tags`.
pub fn extract_tags(body: &str, frontmatter: &Frontmatter) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    for key in ["tags", "tag"] {
        match frontmatter.get_path(key) {
            FieldValue::List(items) => {
                for item in items {
                    match item {
                        FieldValue::String(s) => insert_tag_words(s, &mut tags),
                        FieldValue::Number(n) => insert_tag(&n.to_string(), &mut tags),
                        _ => {}
                    }
                }
            }
            FieldValue::String(s) => insert_tag_words(s, &mut tags),
            _ => {}
        }
    }

    for (_, line) in content_lines(body) {
        let trimmed = line.trim_start();
        // ATX headings start with `#`, which the tag regex would otherwise see
        if trimmed.starts_with("# ") || trimmed.starts_with("##") {
            continue;
        }
        let without_code = INLINE_CODE_RE.replace_all(line, "");
        for cap in INLINE_TAG_RE.captures_iter(&without_code) {
            if let Some(m) = cap.get(1) {
                insert_tag(m.as_str(), &mut tags);
            }
        }
    }

    tags
}

/// Extract checklist items. `line_offset` is the 1-based line the body starts on.
pub fn extract_tasks(body: &str, line_offset: usize) -> Vec<TaskItem> {
    content_lines(body)
        .filter_map(|(index, line)| {
            let cap = TASK_RE.captures(line)?;
            Some(TaskItem {
                text: cap.get(2).map_or("", |m| m.as_str()).trim().to_string(),
                completed: cap.get(1).is_some_and(|m| m.as_str() != " "),
                line: line_offset + index,
            })
        })
        .collect()
}

/// Iterate `(0-based index, line)` pairs outside fenced code blocks.
fn content_lines(body: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut fence: Option<&str> = None;
    body.lines().enumerate().filter(move |(_, line)| {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some("```")
        } else if trimmed.starts_with("~~~") {
            Some("~~~")
        } else {
            None
        };

        match (fence, marker) {
            (None, Some(m)) => {
                fence = Some(m);
                false
            }
            (Some(open), Some(m)) if open == m => {
                fence = None;
                false
            }
            (Some(_), _) => false,
            (None, None) => true,
        }
    })
}

fn insert_tag_words(s: &str, tags: &mut BTreeSet<String>) {
    for word in s.split(|c: char| c == ',' || c.is_whitespace()) {
        insert_tag(word, tags);
    }
}

fn insert_tag(raw: &str, tags: &mut BTreeSet<String>) {
    let tag = raw.trim().trim_start_matches('#').trim_end_matches('/');
    // `#123` is an issue reference, not a tag
    if !tag.is_empty() && !tag.chars().all(|c| c.is_ascii_digit()) {
        tags.insert(tag.to_string());
    }
}

fn collect_reference(value: &FieldValue, links: &mut BTreeSet<String>) {
    match value {
        FieldValue::String(s) => {
            let target = s.trim().trim_start_matches("[[").trim_end_matches("]]");
            let target = target.split(['|', '#']).next().unwrap_or("").trim();
            if !target.is_empty() {
                links.insert(target.to_string());
            }
        }
        FieldValue::List(items) => {
            for item in items {
                collect_reference(item, links);
            }
        }
        _ => {}
    }
}

fn local_link_target(url: &str) -> Option<String> {
    if url.contains("://") || url.starts_with("mailto:") || url.starts_with('#') {
        return None;
    }
    let path = url.split('#').next().unwrap_or(url).replace("%20", " ");
    let lower = path.to_lowercase();

    // Only notes: `.md` files or extensionless references
    let is_note = lower.ends_with(".md")
        || lower.ends_with(".markdown")
        || !path.rsplit('/').next().unwrap_or("").contains('.');
    is_note.then_some(path)
}

fn parse_options() -> Options<'static> {
    let mut options = Options::default();
    // Enable GFM extensions for compatibility
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.parse.smart = false;
    options
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants() {
        match child.data.borrow().value {
            NodeValue::Text(ref t) => text.push_str(t),
            NodeValue::Code(ref code) => text.push_str(&code.literal),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::parse;

    fn fm(yaml: &str) -> Frontmatter {
        parse(&format!("---\n{yaml}\n---\n")).unwrap().frontmatter.unwrap()
    }

    #[test]
    fn test_extract_headings() {
        let body = "# Title\n\nText\n\n## Section `code`\n\n```\n# not a heading\n```\n";
        assert_eq!(extract_headings(body), vec!["Title", "Section code"]);
    }

    #[test]
    fn test_extract_wikilinks() {
        let body = "This links to [[other-note]] and [[another|with alias]].\n\
                    Also [[path/to/note#Section]] works.\n";
        let links = extract_links(body, &Frontmatter::default());
        let links: Vec<_> = links.iter().map(String::as_str).collect();
        assert_eq!(links, vec!["another", "other-note", "path/to/note"]);
    }

    #[test]
    fn test_extract_markdown_links_skip_external_and_images() {
        let body = "[local](notes/a.md) [web](https://example.com) ![img](pic.png) \
                    [bare](Some%20Note)";
        let links = extract_links(body, &Frontmatter::default());
        let links: Vec<_> = links.iter().map(String::as_str).collect();
        assert_eq!(links, vec!["Some Note", "notes/a.md"]);
    }

    #[test]
    fn test_frontmatter_references_are_links() {
        let links = extract_links("", &fm("project: \"[[Alpha]]\"\nrelated: [b, c]"));
        let links: Vec<_> = links.iter().map(String::as_str).collect();
        assert_eq!(links, vec!["Alpha", "b", "c"]);
    }

    #[test]
    fn test_extract_tags_from_frontmatter_and_body() {
        let body = "# Heading\nSome #inline text and #area/sub, not#this.\n\
                    Issue #42 and `#code` are ignored.\n```\n#fenced\n```\n";
        let tags = extract_tags(body, &fm("tags: [\"#a\", b]\ntag: c d"));
        let tags: Vec<_> = tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["a", "area/sub", "b", "c", "d", "inline"]);
    }

    #[test]
    fn test_extract_tasks_with_line_numbers() {
        let body = "intro\n- [ ] open task\n- [x] done task\n* [X] also done\n- [] not a task\n";
        let tasks = extract_tasks(body, 5);
        assert_eq!(tasks.len(), 3);
        assert_eq!(
            tasks[0],
            TaskItem { text: "open task".into(), completed: false, line: 6 }
        );
        assert!(tasks[1].completed);
        assert_eq!(tasks[2].line, 8);
    }
}
