//! The query engine: caches, evaluator and renderer behind one handle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{
    CacheError, CacheSettings, ContentCache, ContextCache, StructureCache, StructureEntry,
    StructureSnapshot,
};
use crate::config::ResolvedConfig;
use crate::query::{self, DocumentSource, Evaluator, QueryError, QueryKind, QueryResult};
use crate::render::{self, RenderMode, RenderOptions};
use crate::vault::{Document, VaultWalker, VaultWalkerError};

/// Sizes and ages of every cache tier.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub structure_size: usize,
    pub content_cache_size: usize,
    pub context_cache_size: usize,
    /// Time since the current structure snapshot was scanned, if there is one.
    pub last_full_scan_age: Option<Duration>,
    /// Full scans performed since the engine was created.
    pub structure_scans: u64,
}

/// Context cache key for one query execution.
///
/// The structure generation is part of the key, so results computed against
/// an older scan are never served after a rescan.
#[derive(Serialize)]
struct QueryKey<'a> {
    query: &'a str,
    base: &'a str,
    generation: u64,
}

/// Owns the cache tiers for one vault.
///
/// All methods take `&self`; the engine can be shared across threads
/// behind an `Arc`.
pub struct QueryEngine {
    structure: StructureCache,
    content: ContentCache,
    context: ContextCache<QueryResult>,
    render_options: RenderOptions,
}

impl QueryEngine {
    pub fn new(
        vault_root: &Path,
        excluded_folders: Vec<PathBuf>,
        settings: CacheSettings,
        render_options: RenderOptions,
    ) -> Result<Self, VaultWalkerError> {
        let walker = VaultWalker::with_exclusions(vault_root, excluded_folders)?;
        let content =
            ContentCache::new(walker.root(), settings.content_capacity, settings.content_ttl);

        Ok(Self {
            structure: StructureCache::new(walker, settings.structure_ttl),
            content,
            context: ContextCache::new(settings.context_ttl, settings.context_capacity),
            render_options,
        })
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, VaultWalkerError> {
        Self::new(
            &config.vault_root,
            config.excluded_folders.clone(),
            config.cache.to_settings(),
            config.render.to_options(),
        )
    }

    /// Current document list, rescanning when stale or when forced.
    pub fn get_structure(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<StructureSnapshot>, CacheError> {
        self.structure.get_structure(force_refresh)
    }

    /// Parsed snapshot of one document.
    ///
    /// Fails with [`CacheError::NotFound`] when the path is not in the
    /// structure map.
    pub fn get_content(&self, path: &str) -> Result<Arc<Document>, CacheError> {
        let path = normalize_path(path);
        let snapshot = self.structure.get_structure(false)?;
        let entry = snapshot.get(&path).ok_or_else(|| CacheError::NotFound(path.clone()))?;
        self.content.get(entry)
    }

    /// Forget everything cached about `path` after an external write.
    ///
    /// The structure map is marked stale and every memoised query result is
    /// dropped, whichever documents they touched.
    pub fn invalidate(&self, path: &str) {
        let path = normalize_path(path);
        self.structure.invalidate(&path);
        self.content.invalidate(&path);
        self.context.clear();
        tracing::debug!("invalidated {}", path);
    }

    pub fn invalidate_all(&self) {
        self.structure.invalidate_all();
        self.content.clear();
        self.context.clear();
        tracing::debug!("invalidated all caches");
    }

    /// Parse and evaluate `query` under `base_path`.
    ///
    /// Never fails: parse and scan errors come back in [`QueryResult::error`].
    /// Complete results are memoised per query, base path and structure scan.
    pub fn execute_query(&self, query: &str, base_path: &str) -> QueryResult {
        let ast = match query::parse(query) {
            Ok(ast) => ast,
            Err(e) => {
                tracing::debug!("rejected query {:?}: {}", query, e);
                return QueryResult::failed(QueryKind::Empty, &QueryError::Parse(e));
            }
        };
        if ast.is_empty() {
            return QueryResult::empty(QueryKind::Empty);
        }

        let snapshot = match self.structure.get_structure(false) {
            Ok(snapshot) => snapshot,
            Err(e) => return QueryResult::failed(ast.kind, &QueryError::StructureScan(e)),
        };

        let base = normalize_path(base_path);
        let key = QueryKey { query: query.trim(), base: &base, generation: snapshot.generation() };
        let pinned = Pinned { snapshot: Arc::clone(&snapshot), content: &self.content };

        self.context
            .get_or_try_compute(&key, || {
                let mut result = Evaluator::new(&pinned).evaluate(&ast, &base);
                result.render_mode =
                    render::resolve_mode(&result, RenderMode::Smart, &self.render_options);
                // Failed or partial results are returned but not memoised
                if result.is_ok() && result.skipped == 0 { Ok(result) } else { Err(result) }
            })
            .unwrap_or_else(|result| result)
    }

    /// Render with this engine's render options.
    pub fn render_results(&self, result: &QueryResult, mode: RenderMode) -> String {
        render::render(result, mode, &self.render_options)
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    pub fn stats(&self) -> CacheStats {
        let snapshot = self.structure.peek();
        CacheStats {
            structure_size: snapshot.as_ref().map_or(0, |s| s.len()),
            content_cache_size: self.content.len(),
            context_cache_size: self.context.len(),
            last_full_scan_age: snapshot.map(|s| s.age()),
            structure_scans: self.structure.scan_count(),
        }
    }
}

/// A source fixed to one structure snapshot for the length of a query.
struct Pinned<'a> {
    snapshot: Arc<StructureSnapshot>,
    content: &'a ContentCache,
}

impl DocumentSource for Pinned<'_> {
    fn structure(&self) -> Result<Arc<StructureSnapshot>, CacheError> {
        Ok(Arc::clone(&self.snapshot))
    }

    fn document(&self, entry: &StructureEntry) -> Result<Arc<Document>, CacheError> {
        self.content.get(entry)
    }
}

/// Vault-relative, `/`-separated, without leading `./` or `/`.
fn normalize_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let path = path.strip_prefix("./").unwrap_or(&path);
    path.trim_matches('/').to_string()
}
