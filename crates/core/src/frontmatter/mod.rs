//! Frontmatter splitting and the typed value model.
//!
//! This module provides functionality to:
//! - Split a leading `---` YAML block from a markdown body
//! - Convert YAML into [`FieldValue`], the tagged variant every query sees
//! - Resolve dotted field paths into nested mappings

pub mod parser;
pub mod value;

pub use parser::{FrontmatterParseError, ParsedDocument, parse, parse_lenient};
pub use value::{CIRCULAR_MARKER, FieldValue, Frontmatter, parse_date};
