//! Point-in-time map of every document in the vault.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use super::CacheError;
use crate::vault::VaultWalker;

/// Lightweight metadata for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureEntry {
    /// Vault-relative path, `/`-separated.
    pub path: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// An immutable result of one full scan.
///
/// Readers hold an `Arc` to the snapshot they started with; a rescan
/// publishes a new snapshot and never touches this one.
#[derive(Debug)]
pub struct StructureSnapshot {
    entries: Vec<StructureEntry>,
    index: HashMap<String, usize>,
    scanned_at: Instant,
    generation: u64,
    /// Set by `invalidate`; a stale snapshot is still readable but never fresh.
    stale: bool,
}

impl StructureSnapshot {
    fn new(entries: Vec<StructureEntry>, scanned_at: Instant, generation: u64) -> Self {
        let index = entries.iter().enumerate().map(|(i, e)| (e.path.clone(), i)).collect();
        Self { entries, index, scanned_at, generation, stale: false }
    }

    /// Build a snapshot from entries gathered elsewhere, stamped as scanned now.
    pub fn from_entries(mut entries: Vec<StructureEntry>, generation: u64) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        Self::new(entries, Instant::now(), generation)
    }

    /// All entries, sorted by path.
    pub fn entries(&self) -> &[StructureEntry] {
        &self.entries
    }

    pub fn get(&self, path: &str) -> Option<&StructureEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Monotonic scan number; changes whenever a new scan is published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn age(&self) -> Duration {
        self.scanned_at.elapsed()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.stale && self.scanned_at.elapsed() < ttl
    }

    fn marked_stale(&self) -> Self {
        let mut snapshot = Self::new(self.entries.clone(), self.scanned_at, self.generation);
        snapshot.stale = true;
        snapshot
    }

    fn without(&self, path: &str) -> Self {
        let entries: Vec<_> = self.entries.iter().filter(|e| e.path != path).cloned().collect();
        let mut snapshot = Self::new(entries, self.scanned_at, self.generation);
        snapshot.stale = true;
        snapshot
    }
}

/// Structure cache over a vault walker.
pub struct StructureCache {
    walker: VaultWalker,
    ttl: Duration,
    current: ArcSwapOption<StructureSnapshot>,
    /// Serialises full scans so concurrent misses trigger one walk.
    scan_lock: Mutex<()>,
    generation: AtomicU64,
    /// Bumped by every invalidation; a scan that overlaps one publishes stale.
    invalidations: AtomicU64,
}

impl StructureCache {
    pub fn new(walker: VaultWalker, ttl: Duration) -> Self {
        Self {
            walker,
            ttl,
            current: ArcSwapOption::empty(),
            scan_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Return the current snapshot, rescanning if it is absent, stale, past
    /// its TTL, or `force_refresh` is set.
    pub fn get_structure(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<StructureSnapshot>, CacheError> {
        if !force_refresh && let Some(snapshot) = self.fresh_snapshot() {
            tracing::trace!("structure cache hit ({} documents)", snapshot.len());
            return Ok(snapshot);
        }

        let _guard = self.scan_lock.lock();

        // Another caller may have finished a scan while we waited
        if !force_refresh && let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        self.rescan()
    }

    /// The last published snapshot, without checking freshness.
    pub fn peek(&self) -> Option<Arc<StructureSnapshot>> {
        self.current.load_full()
    }

    /// Drop `path` from the map and force a full rescan on next access.
    pub fn invalidate(&self, path: &str) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.current.rcu(|current| {
            current.as_ref().map(|snapshot| Arc::new(snapshot.without(path)))
        });
    }

    /// Forget the whole map.
    pub fn invalidate_all(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.current.store(None);
    }

    /// Number of full scans performed so far.
    pub fn scan_count(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    fn fresh_snapshot(&self) -> Option<Arc<StructureSnapshot>> {
        self.current.load_full().filter(|s| s.is_fresh(self.ttl))
    }

    fn rescan(&self) -> Result<Arc<StructureSnapshot>, CacheError> {
        let started = Instant::now();
        let seen = self.invalidations.load(Ordering::SeqCst);
        let files = self.walker.walk()?;

        let entries = files
            .into_iter()
            .map(|f| StructureEntry { path: f.relative_path, size: f.size, modified: f.modified })
            .collect();

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let snapshot = Arc::new(StructureSnapshot::new(entries, Instant::now(), generation));
        self.current.store(Some(Arc::clone(&snapshot)));

        // An invalidation that raced the walk may describe a file this scan missed
        if self.invalidations.load(Ordering::SeqCst) != seen {
            tracing::debug!("invalidated during scan; keeping structure stale");
            self.current.rcu(|current| {
                current.as_ref().map(|s| Arc::new(s.marked_stale()))
            });
        }

        tracing::debug!(
            documents = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scanned vault {}",
            self.walker.root().display()
        );

        Ok(snapshot)
    }
}
