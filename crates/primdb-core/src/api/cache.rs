//! Read memoization keyed by table and filter signature.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::types::Record;

use super::filter::Clause;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    table: String,
    filter: String,
}

/// Hit/miss counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoized select results, one entry per (table, filter signature).
///
/// Entries live until the table is written (`invalidate`) or the cache is
/// cleared. A disabled cache always runs the loader and stores nothing.
#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<HashMap<CacheKey, Vec<Record>>>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    fn with_enabled(enabled: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the cached rows for `(table, filter)`, or run `load` and
    /// remember its result. Errors from `load` are returned and not cached.
    pub fn get_or_load<F>(&self, table: &str, filter: &Clause, load: F) -> Result<Vec<Record>>
    where
        F: FnOnce() -> Result<Vec<Record>>,
    {
        if !self.enabled {
            return load();
        }

        let key = CacheKey {
            table: table.to_string(),
            filter: filter.signature(),
        };
        if let Some(rows) = self.entries.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(table, filter = %key.filter, "cache hit");
            return Ok(rows.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(table, filter = %key.filter, "cache miss");
        let rows = load()?;
        self.entries.lock().insert(key, rows.clone());
        Ok(rows)
    }

    /// Drop every entry belonging to `table`.
    pub fn invalidate(&self, table: &str) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| key.table != table);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(table, removed, "cache invalidated");
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
