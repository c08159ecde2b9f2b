//! Multi-tier caching of vault state.
//!
//! - [`StructureCache`]: path → size/mtime map, replaced wholesale on rescan
//! - [`ContentCache`]: bounded map of parsed [`Document`](crate::vault::Document) snapshots
//! - [`ContextCache`]: memoised computed results keyed by a hash of their inputs
//!
//! Invalidation is coarse: invalidating one path marks the whole structure
//! map stale and clears every memoised result.

pub mod content;
pub mod context;
pub mod hasher;
pub mod structure;

use std::time::Duration;

use thiserror::Error;

use crate::vault::VaultWalkerError;

pub use content::ContentCache;
pub use context::ContextCache;
pub use structure::{StructureCache, StructureEntry, StructureSnapshot};

/// Errors raised while reading vault state through the caches.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("document not found in vault: {0}")]
    NotFound(String),

    #[error("failed to read document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan vault: {0}")]
    Scan(#[from] VaultWalkerError),
}

/// Lifetimes and bounds for every cache tier.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub structure_ttl: Duration,
    pub content_ttl: Duration,
    pub content_capacity: usize,
    pub context_ttl: Duration,
    pub context_capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            structure_ttl: Duration::from_secs(300),
            content_ttl: Duration::from_secs(600),
            content_capacity: 500,
            context_ttl: Duration::from_secs(300),
            context_capacity: 128,
        }
    }
}
