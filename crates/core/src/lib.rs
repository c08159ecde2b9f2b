#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Cached TABLE/LIST/TASK queries over a vault of markdown notes.

pub mod cache;
pub mod config;
pub mod engine;
pub mod frontmatter;
pub mod query;
pub mod render;
pub mod vault;

pub use cache::{CacheError, CacheSettings};
pub use engine::{CacheStats, QueryEngine};
pub use query::{ErrorKind, QueryResult};
pub use render::{RenderMode, RenderOptions};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn rustc_version() -> String {
    std::env::var("RUSTC_VERSION").unwrap_or_else(|_| "unknown".into())
}

/// One-line build description for `mdq doctor`.
pub fn build_info() -> String {
    format!(
        "mdquery-core v{} | rustc {} on {}",
        version(),
        rustc_version(),
        std::env::consts::OS
    )
}
