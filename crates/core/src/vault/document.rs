//! Immutable document snapshots.

use std::collections::BTreeSet;
use std::time::SystemTime;

use crate::frontmatter::{self, Frontmatter};

use super::extractor::{self, TaskItem};

/// A point-in-time view of one markdown file.
///
/// Snapshots are never mutated; a newer on-disk version produces a new
/// `Document` which replaces the old one in the content cache.
#[derive(Debug, Clone)]
pub struct Document {
    /// Vault-relative path, `/`-separated.
    pub path: String,
    pub size: u64,
    pub modified: SystemTime,
    pub frontmatter: Frontmatter,
    pub body: String,
    pub headings: Vec<String>,
    pub outgoing_links: BTreeSet<String>,
    /// Frontmatter and inline tags, without the leading `#`.
    pub tags: BTreeSet<String>,
    pub tasks: Vec<TaskItem>,
}

impl Document {
    /// Build a snapshot from raw file text.
    ///
    /// Malformed frontmatter does not fail the document: it is logged and
    /// whatever keys still parse on their own are kept.
    pub fn from_source(path: &str, size: u64, modified: SystemTime, raw: &str) -> Self {
        let parsed = frontmatter::parse(raw).unwrap_or_else(|e| {
            tracing::warn!("malformed frontmatter in {}: {}", path, e);
            frontmatter::parse_lenient(raw)
        });

        let frontmatter = parsed.frontmatter.unwrap_or_default();
        let body = parsed.body;

        Self {
            path: path.to_string(),
            size,
            modified,
            headings: extractor::extract_headings(&body),
            outgoing_links: extractor::extract_links(&body, &frontmatter),
            tags: extractor::extract_tags(&body, &frontmatter),
            tasks: extractor::extract_tasks(&body, parsed.body_line_offset),
            frontmatter,
            body,
        }
    }

    /// File name without extension.
    pub fn name(&self) -> &str {
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        file.rsplit_once('.').map_or(file, |(stem, _)| stem)
    }

    /// Containing folder, empty for notes at the vault root.
    pub fn folder(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(folder, _)| folder)
    }

    pub fn extension(&self) -> &str {
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        file.rsplit_once('.').map_or("", |(_, ext)| ext)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag.trim_start_matches('#'))
    }
}
