//! Response cache for rendered chart output
//!
//! A key → payload map with a fixed TTL and lazy expiry:
//!
//! - `get` returns unexpired payloads and purges an expired entry it touches
//! - `set` inserts or overwrites, resetting the entry's age
//! - `clear` empties the map and reports how many entries went
//! - `status` counts valid and expired entries without purging anything
//!
//! There is no size bound and no background sweep. Expired entries stay in the
//! map until they are read or the cache is cleared.
//!
//! Concurrent misses on the same key are not coalesced; each caller fetches and
//! renders, and the last `set` wins.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use headcount_dashboard::cache::ResponseCache;
//!
//! let cache = ResponseCache::new(Duration::from_secs(300));
//! cache.set("staff_donut_2023/2024", "<div>...</div>".to_string());
//! assert!(cache.get("staff_donut_2023/2024").is_some());
//! assert_eq!(cache.clear(), 1);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

/// Default time-to-live for cached responses
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached payload and when it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: String,
    pub stored_at: Instant,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// Snapshot of cache occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
    pub cache_ttl_seconds: u64,
}

/// Fixed-TTL response cache
///
/// Every operation takes the lock for a single in-memory pass and never across
/// an await point.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create an empty cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Payload for `key` if present and unexpired; an expired entry is removed
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let valid = entries.get(key)?.is_valid(Instant::now(), self.ttl);

        if valid {
            debug!(key, "Cache hit");
            entries.get(key).map(|entry| entry.payload.clone())
        } else {
            entries.remove(key);
            debug!(key, "Cache entry expired");
            None
        }
    }

    /// Insert or overwrite `key`, stamping it with the current time
    pub fn set(&self, key: impl Into<String>, payload: String) {
        let key = key.into();
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            stored_at: Instant::now(),
        };
        self.entries.lock().insert(key, entry);
    }

    /// Remove every entry, returning how many were removed
    pub fn clear(&self) -> usize {
        let removed = {
            let mut entries = self.entries.lock();
            let removed = entries.len();
            entries.clear();
            removed
        };
        info!(removed, "Cache cleared");
        removed
    }

    /// Count valid and expired entries without purging
    pub fn status(&self) -> CacheStatus {
        let now = Instant::now();
        let entries = self.entries.lock();
        let active = entries
            .values()
            .filter(|entry| entry.is_valid(now, self.ttl))
            .count();

        CacheStatus {
            total_entries: entries.len(),
            active_entries: active,
            expired_entries: entries.len() - active,
            cache_ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Total entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Deterministic cache key for a logical request
///
/// The key is `(endpoint, session, faculty)` as a JSON array, so parameter values
/// can never run into each other: `["staff_donut","2023/2024",null]`.
pub fn request_key(endpoint: &str, session: Option<&str>, faculty: Option<&str>) -> String {
    serde_json::json!([endpoint, session, faculty]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT_TTL: Duration = Duration::from_millis(50);

    #[test]
    fn test_default_ttl() {
        let cache = ResponseCache::default();
        assert_eq!(cache.ttl(), Duration::from_secs(300));
        assert_eq!(cache.status().cache_ttl_seconds, 300);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_after_set() {
        let cache = ResponseCache::default();
        cache.set("staff_donut_2023/2024", "chart".to_string());
        assert_eq!(cache.get("staff_donut_2023/2024"), Some("chart".to_string()));
        assert_eq!(cache.get("student_donut_2023/2024"), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_purged_on_read() {
        let cache = ResponseCache::new(SHORT_TTL);
        cache.set("a", "payload".to_string());

        tokio::time::sleep(SHORT_TTL + Duration::from_millis(20)).await;

        // Still counted until touched
        let status = cache.status();
        assert_eq!(status.total_entries, 1);
        assert_eq!(status.active_entries, 0);
        assert_eq!(status.expired_entries, 1);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.status().total_entries, 0);
    }

    #[tokio::test]
    async fn test_overwrite_resets_age() {
        let cache = ResponseCache::new(Duration::from_millis(120));
        cache.set("a", "old".to_string());

        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.set("a", "new".to_string());
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get("a"), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_reports_removed() {
        let cache = ResponseCache::new(SHORT_TTL);
        cache.set("a", "1".to_string());
        tokio::time::sleep(SHORT_TTL + Duration::from_millis(20)).await;
        cache.set("b", "2".to_string());
        cache.set("c", "3".to_string());

        let status = cache.status();
        assert_eq!(status.active_entries, 2);
        assert_eq!(status.expired_entries, 1);

        assert_eq!(cache.clear(), 3);
        assert_eq!(cache.status().total_entries, 0);
        assert_eq!(cache.clear(), 0);
    }

    #[test]
    fn test_request_key() {
        assert_eq!(
            request_key("staff_donut", Some("2023/2024"), None),
            r#"["staff_donut","2023/2024",null]"#
        );
        assert_eq!(request_key("staff_trend", None, None), r#"["staff_trend",null,null]"#);
        assert_eq!(
            request_key("student_donut", Some("2022/2023"), Some("Science")),
            r#"["student_donut","2022/2023","Science"]"#
        );
        assert_eq!(
            request_key("staff_donut", Some("2023/2024"), Some("Law")),
            request_key("staff_donut", Some("2023/2024"), Some("Law"))
        );
    }

    #[test]
    fn test_request_key_separators_in_values_do_not_collide() {
        assert_ne!(
            request_key("staff_donut", Some("2023/2024_faculty=Technology"), None),
            request_key("staff_donut", Some("2023/2024"), Some("Technology"))
        );
        assert_ne!(
            request_key("staff_trend", None, Some("Law")),
            request_key("staff_trend", Some("Law"), None)
        );
        assert_ne!(
            request_key("staff_donut", Some(r#"a","b"#), None),
            request_key("staff_donut", Some("a"), Some("b"))
        );
    }
}
