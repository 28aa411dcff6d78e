//! # Content Cache
//! Memoizes rewrite results per `(time window, item id)` key.
//!
//! Freshness is absolute (no sliding refresh): an entry is served while
//! `now - created_at < ttl` and is treated as absent afterwards. `sweep()`
//! only reclaims memory; `get()` enforces freshness on its own.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};
use metrics::counter;

use crate::ingest::window::TimeWindow;
use crate::rewrite::RewriteResult;

/// Time source, injectable so expiry can be tested with a simulated clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut g = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *g += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Composite key: the window label plus the item id, e.g. `"This Month|1abc"`.
pub fn cache_key(window: TimeWindow, item_id: &str) -> String {
    format!("{}|{}", window.label(), item_id)
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub result: RewriteResult,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe key → entry map. At most one entry per key; last write wins.
pub struct ContentCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ContentCache {
    pub const DEFAULT_TTL_SECS: i64 = 3600;

    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.created_at < self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are value snapshots; a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Fresh result for `key`, or `None` (absent or expired).
    pub fn get(&self, key: &str) -> Option<RewriteResult> {
        let now = self.clock.now();
        let hit = self
            .lock()
            .get(key)
            .filter(|e| self.is_fresh(e, now))
            .map(|e| e.result.clone());
        if hit.is_some() {
            counter!("cache_hits_total").increment(1);
        } else {
            counter!("cache_misses_total").increment(1);
        }
        hit
    }

    /// Unconditional upsert stamped with the current time.
    pub fn put(&self, key: &str, result: RewriteResult) {
        let entry = CacheEntry {
            key: key.to_string(),
            result,
            created_at: self.clock.now(),
        };
        self.lock().insert(key.to_string(), entry);
        counter!("cache_stores_total").increment(1);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut map = self.lock();
        let before = map.len();
        map.retain(|_, e| now - e.created_at < self.ttl);
        let removed = before - map.len();
        if removed > 0 {
            tracing::debug!(target: "cache", removed, remaining = map.len(), "swept expired entries");
        }
        removed
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(Duration::seconds(Self::DEFAULT_TTL_SECS))
    }
}
