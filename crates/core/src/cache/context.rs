//! Memoisation of expensive computed results.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use super::hasher::params_key;

struct Memo<V> {
    value: V,
    stored_at: Instant,
}

struct MemoState<V> {
    entries: HashMap<String, Memo<V>>,
    order: VecDeque<String>,
}

/// Result cache keyed by a hash of the parameters that produced each value.
///
/// Entries live for `ttl` and at most `capacity` are kept, oldest evicted
/// first. Any document invalidation clears the cache completely.
pub struct ContextCache<V> {
    ttl: Duration,
    capacity: usize,
    state: Mutex<MemoState<V>>,
}

impl<V: Clone> ContextCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            state: Mutex::new(MemoState { entries: HashMap::new(), order: VecDeque::new() }),
        }
    }

    /// Return the cached value for `params`, or compute and store it.
    pub fn get_or_compute<P, F>(&self, params: &P, compute: F) -> V
    where
        P: Serialize + ?Sized,
        F: FnOnce() -> V,
    {
        match self.get_or_try_compute(params, || Ok::<V, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but failures are returned
    /// to the caller and never stored.
    pub fn get_or_try_compute<P, F, E>(&self, params: &P, compute: F) -> Result<V, E>
    where
        P: Serialize + ?Sized,
        F: FnOnce() -> Result<V, E>,
    {
        let key = match params_key(params) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("uncacheable parameters, computing directly: {}", e);
                return compute();
            }
        };

        if let Some(value) = self.lookup(&key) {
            tracing::trace!("context cache hit: {}", key);
            return Ok(value);
        }

        // Computed without holding the lock; concurrent misses may compute twice
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
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

    fn lookup(&self, key: &str) -> Option<V> {
        let state = self.state.lock();
        state
            .entries
            .get(key)
            .filter(|memo| memo.stored_at.elapsed() < self.ttl)
            .map(|memo| memo.value.clone())
    }

    fn insert(&self, key: String, value: V) {
        let mut state = self.state.lock();
        if state.entries.remove(&key).is_some() {
            state.order.retain(|k| k != &key);
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, Memo { value, stored_at: Instant::now() });

        while state.entries.len() > self.capacity {
            let Some(oldest) = state.order.pop_front() else { break };
            state.entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn hit_skips_compute() {
        let cache = ContextCache::new(Duration::from_secs(300), 10);
        let calls = Cell::new(0);

        let compute = || {
            calls.set(calls.get() + 1);
            42
        };
        assert_eq!(cache.get_or_compute("params", compute), 42);
        assert_eq!(cache.get_or_compute("params", compute), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn different_params_compute_separately() {
        let cache = ContextCache::new(Duration::from_secs(300), 10);

        assert_eq!(cache.get_or_compute(&("q", 1), || 1), 1);
        assert_eq!(cache.get_or_compute(&("q", 2), || 2), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn expired_entries_recompute() {
        let cache = ContextCache::new(Duration::ZERO, 10);

        cache.get_or_compute("p", || 1);
        assert_eq!(cache.get_or_compute("p", || 2), 2);
    }

    #[test]
    fn failures_are_not_stored() {
        let cache: ContextCache<i32> = ContextCache::new(Duration::from_secs(300), 10);

        let err = cache.get_or_try_compute("p", || Err::<i32, _>("boom"));
        assert_eq!(err, Err("boom"));
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_try_compute("p", || Ok::<_, &str>(7)), Ok(7));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let cache = ContextCache::new(Duration::from_secs(300), 2);

        cache.get_or_compute("a", || 1);
        cache.get_or_compute("b", || 2);
        cache.get_or_compute("c", || 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_or_compute("a", || 10), 10);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = ContextCache::new(Duration::from_secs(300), 10);
        cache.get_or_compute("a", || 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_compute("a", || 5), 5);
    }
}
