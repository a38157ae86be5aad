//! In-memory caching layer for registry lookups.

use crate::types::FetchOutcome;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const KEY_DELIMITER: &str = "||";

/// Cached outcome with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: FetchOutcome,
    inserted_at: Instant,
}

/// Thread-safe cache for lookup outcomes, successes and failures alike.
///
/// Expiry is decided per `get` against the entry's age, so the same store
/// can serve callers with different freshness requirements. Growth is
/// unbounded: nothing is evicted except expired entries touched by `get`
/// and explicit `clear` calls. Acceptable for a short-lived CLI process.
#[derive(Debug, Clone, Default)]
pub struct HttpCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl HttpCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache key from arbitrary components (method, URL, ...).
    ///
    /// Identical part sequences always produce identical keys; the
    /// delimiter does not occur in HTTP methods or URLs.
    pub fn make_key<I, S>(parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        parts
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(KEY_DELIMITER)
    }

    /// Get a cached outcome if present and not older than `ttl`.
    ///
    /// `ttl = None` never expires. An expired entry is removed on the way
    /// out (lazy expiry, no background sweep).
    pub fn get(&self, key: &str, ttl: Option<Duration>) -> Option<FetchOutcome> {
        let entry = self.entries.get(key)?;

        if let Some(ttl) = ttl {
            if entry.inserted_at.elapsed() > ttl {
                drop(entry);
                self.entries.remove(key);
                return None;
            }
        }

        Some(entry.outcome.clone())
    }

    /// Store an outcome, stamping it with the current time.
    pub fn set(&self, key: &str, outcome: FetchOutcome) {
        let entry = CacheEntry {
            outcome,
            inserted_at: Instant::now(),
        };
        self.entries.insert(key.to_string(), entry);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
