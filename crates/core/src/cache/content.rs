//! Bounded cache of parsed document snapshots.

use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;

use super::CacheError;
use super::structure::StructureEntry;
use crate::vault::Document;

struct ContentEntry {
    document: Arc<Document>,
    cached_modified: SystemTime,
    cached_at: Instant,
}

#[derive(Default)]
struct LruState {
    entries: HashMap<String, ContentEntry>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

impl LruState {
    fn remove(&mut self, path: &str) -> bool {
        if self.entries.remove(path).is_some() {
            self.order.retain(|p| p != path);
            true
        } else {
            false
        }
    }
}

/// Path → document cache, evicting the oldest insertion beyond `capacity`.
///
/// An entry is served only while its cached mtime matches the structure
/// entry it is looked up with and it is younger than `ttl`.
pub struct ContentCache {
    root: PathBuf,
    capacity: usize,
    ttl: Duration,
    state: Mutex<LruState>,
}

impl ContentCache {
    pub fn new(root: impl Into<PathBuf>, capacity: usize, ttl: Duration) -> Self {
        Self { root: root.into(), capacity, ttl, state: Mutex::new(LruState::default()) }
    }

    /// Return the document for `entry`, reading from disk when the cached copy
    /// is absent, outdated or expired.
    pub fn get(&self, entry: &StructureEntry) -> Result<Arc<Document>, CacheError> {
        if let Some(document) = self.lookup(entry) {
            tracing::trace!("content cache hit: {}", entry.path);
            return Ok(document);
        }

        tracing::trace!("content cache miss: {}", entry.path);
        let absolute = self.root.join(&entry.path);
        let bytes = fs::read(&absolute)
            .map_err(|source| CacheError::Read { path: entry.path.clone(), source })?;
        let raw = String::from_utf8_lossy(&bytes);
        if matches!(raw, Cow::Owned(_)) {
            tracing::warn!("{} is not valid UTF-8; invalid bytes replaced", entry.path);
        }

        let document =
            Arc::new(Document::from_source(&entry.path, entry.size, entry.modified, &raw));
        self.insert(entry, Arc::clone(&document));
        Ok(document)
    }

    /// Drop any cached copy of `path`.
    pub fn invalidate(&self, path: &str) -> bool {
        self.state.lock().remove(path)
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, entry: &StructureEntry) -> Option<Arc<Document>> {
        let state = self.state.lock();
        let cached = state.entries.get(&entry.path)?;
        let valid =
            cached.cached_modified == entry.modified && cached.cached_at.elapsed() < self.ttl;
        valid.then(|| Arc::clone(&cached.document))
    }

    fn insert(&self, entry: &StructureEntry, document: Arc<Document>) {
        let mut state = self.state.lock();
        state.remove(&entry.path);

        state.entries.insert(
            entry.path.clone(),
            ContentEntry { document, cached_modified: entry.modified, cached_at: Instant::now() },
        );
        state.order.push_back(entry.path.clone());

        while state.entries.len() > self.capacity {
            let Some(oldest) = state.order.pop_front() else { break };
            state.entries.remove(&oldest);
            tracing::trace!("content cache evicted {}", oldest);
        }
    }
}
