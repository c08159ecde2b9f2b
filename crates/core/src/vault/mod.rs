//! Vault file discovery and content extraction.
//!
//! This module provides utilities for walking vault directories and
//! turning markdown files into immutable [`Document`] snapshots.

pub mod document;
pub mod extractor;
pub mod walker;

pub use document::Document;
pub use extractor::TaskItem;
pub use walker::{VaultWalker, VaultWalkerError, WalkedFile, is_document_file};
