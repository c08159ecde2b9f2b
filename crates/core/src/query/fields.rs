//! Field resolution against a document.

use std::borrow::Cow;

use chrono::{DateTime, Local};

use crate::frontmatter::FieldValue;
use crate::vault::Document;

/// Resolve a dotted field path.
///
/// `file.*` names are computed from the document itself; everything else is
/// looked up in the frontmatter. An unknown `file.*` name falls back to the
/// frontmatter too, so a literal `file:` mapping stays reachable.
pub fn resolve<'a>(doc: &'a Document, path: &str) -> Cow<'a, FieldValue> {
    if let Some(name) = path.strip_prefix("file.")
        && let Some(value) = builtin(doc, name)
    {
        return Cow::Owned(value);
    }
    Cow::Borrowed(doc.frontmatter.get_path(path))
}

fn builtin(doc: &Document, name: &str) -> Option<FieldValue> {
    let strings = |items: &mut dyn Iterator<Item = &String>| {
        FieldValue::List(items.map(|s| FieldValue::String(s.clone())).collect())
    };

    let value = match name {
        "name" => FieldValue::String(doc.name().to_string()),
        "path" => FieldValue::String(doc.path.clone()),
        "folder" => FieldValue::String(doc.folder().to_string()),
        "ext" => FieldValue::String(doc.extension().to_string()),
        "size" => FieldValue::Number(doc.size as f64),
        "mtime" => FieldValue::Date(DateTime::<Local>::from(doc.modified).naive_local()),
        "tags" => strings(&mut doc.tags.iter()),
        "links" | "outlinks" => strings(&mut doc.outgoing_links.iter()),
        "headings" => strings(&mut doc.headings.iter()),
        "tasks" => FieldValue::Number(doc.tasks.len() as f64),
        _ => return None,
    };
    Some(value)
}
