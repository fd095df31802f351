//! Secret cache with a single shared expiry horizon
//!
//! One [`SecretCache`] serves every adapter of a backend kind. A
//! [`CacheRegistry`] owns one cache per kind; the service factory builds the
//! registry once and hands the matching cache to each adapter it creates,
//! regardless of region or endpoint.
//!
//! Entries carry no individual TTL. Once the horizon passes, the whole map is
//! cleared and the horizon moves forward by the refresh interval. The check
//! runs at the start of every lookup, so a lookup never returns a value that
//! was cached before the most recent expiry.
//!
//! Reads that do not hit the horizon take no lock. Clearing and filling are
//! serialized through one mutex.

use crate::security::SecureString;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secretgate_core::BackendKind;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Refresh interval used until someone overrides it
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// Statistics about cache usage
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of times the whole cache was dropped at the horizon
    pub expirations: u64,
    /// Values stored after a remote fetch
    pub fills: u64,
    /// Fills skipped because another caller stored the key first
    pub discarded_fills: u64,
    /// Current number of cached entries
    pub entries: usize,
    /// When the cache was last cleared
    pub last_cleared: Option<DateTime<Utc>>,
}

impl CacheStats {
    /// Get hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    fills: AtomicU64,
    discarded_fills: AtomicU64,
}

/// Shared expiring cache for one backend kind
pub struct SecretCache {
    name: String,
    entries: DashMap<String, SecureString>,
    /// Reference point for the millisecond clock below
    origin: Instant,
    /// Milliseconds after `origin` at which the map is considered stale
    horizon_ms: AtomicU64,
    refresh_ms: AtomicU64,
    /// Serializes clear-and-advance and insert-if-absent
    write_lock: Mutex<Option<DateTime<Utc>>>,
    counters: Counters,
}

impl SecretCache {
    /// Create a standalone cache with the default refresh interval
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_refresh_interval(name, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_refresh_interval(name: impl Into<String>, refresh: Duration) -> Self {
        let refresh_ms = duration_ms(refresh);
        Self {
            name: name.into(),
            entries: DashMap::new(),
            origin: Instant::now(),
            horizon_ms: AtomicU64::new(refresh_ms),
            refresh_ms: AtomicU64::new(refresh_ms),
            write_lock: Mutex::new(None),
            counters: Counters::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a key, dropping the whole cache first if the horizon has passed
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.expire_if_due();

        match self.entries.get(key) {
            Some(value) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, key = %key, "Cache hit");
                Some(value.as_str().to_owned())
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache = %self.name, key = %key, "Cache miss");
                None
            }
        }
    }

    /// Store a fetched value unless the key is already cached
    ///
    /// The first writer wins. Returns `false` when an earlier value was kept.
    pub fn fill(&self, key: &str, value: &str) -> bool {
        let _guard = self.lock();

        if self.entries.contains_key(key) {
            self.counters.discarded_fills.fetch_add(1, Ordering::Relaxed);
            debug!(cache = %self.name, key = %key, "Key already cached, keeping first value");
            return false;
        }

        self.entries
            .insert(key.to_string(), SecureString::from(value));
        self.counters.fills.fetch_add(1, Ordering::Relaxed);
        debug!(cache = %self.name, key = %key, "Cached secret");
        true
    }

    /// Change the refresh interval and expire the cache immediately
    ///
    /// Affects every adapter sharing this cache.
    pub fn set_refresh_interval(&self, refresh: Duration) {
        let _guard = self.lock();
        self.refresh_ms.store(duration_ms(refresh), Ordering::SeqCst);
        self.horizon_ms.store(0, Ordering::SeqCst);
        info!(
            cache = %self.name,
            refresh_secs = refresh.as_secs_f64(),
            "Secret cache refresh interval changed"
        );
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.load(Ordering::SeqCst))
    }

    /// Drop every entry without moving the horizon
    pub fn clear(&self) {
        let mut last_cleared = self.lock();
        self.entries.clear();
        *last_cleared = Some(Utc::now());
        info!(cache = %self.name, "Cleared secret cache");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let last_cleared = *self.lock();
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            fills: self.counters.fills.load(Ordering::Relaxed),
            discarded_fills: self.counters.discarded_fills.load(Ordering::Relaxed),
            entries: self.entries.len(),
            last_cleared,
        }
    }

    fn now_ms(&self) -> u64 {
        duration_ms(self.origin.elapsed())
    }

    fn expire_if_due(&self) {
        if self.now_ms() < self.horizon_ms.load(Ordering::SeqCst) {
            return;
        }

        let mut last_cleared = self.lock();
        // Another caller may have advanced the horizon while we waited
        let now = self.now_ms();
        if now < self.horizon_ms.load(Ordering::SeqCst) {
            return;
        }

        let dropped = self.entries.len();
        self.entries.clear();
        let next = now.saturating_add(self.refresh_ms.load(Ordering::SeqCst));
        self.horizon_ms.store(next, Ordering::SeqCst);
        *last_cleared = Some(Utc::now());
        self.counters.expirations.fetch_add(1, Ordering::Relaxed);

        debug!(
            cache = %self.name,
            dropped,
            "Refresh interval elapsed, cleared secret cache"
        );
    }

    fn lock(&self) -> MutexGuard<'_, Option<DateTime<Utc>>> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// One cache per backend kind, shared by every adapter of that kind
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    parameter_store: Arc<SecretCache>,
    secrets_manager: Arc<SecretCache>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::with_refresh_interval(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_refresh_interval(refresh: Duration) -> Self {
        let cache = |kind: BackendKind| {
            debug!("Creating secret cache for {}", kind);
            Arc::new(SecretCache::with_refresh_interval(kind.as_str(), refresh))
        };
        Self {
            parameter_store: cache(BackendKind::ParameterStore),
            secrets_manager: cache(BackendKind::SecretsManager),
        }
    }

    /// The cache shared by every adapter of `kind`
    pub fn get(&self, kind: BackendKind) -> &Arc<SecretCache> {
        match kind {
            BackendKind::ParameterStore => &self.parameter_store,
            BackendKind::SecretsManager => &self.secrets_manager,
        }
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCache")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("refresh_interval", &self.refresh_interval())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fill_then_lookup() {
        let cache = SecretCache::new("test");
        assert_eq!(cache.lookup("db/password"), None);

        assert!(cache.fill("db/password", "hunter2"));
        assert_eq!(cache.lookup("db/password"), Some("hunter2".to_string()));
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = SecretCache::new("test");
        assert!(cache.fill("key", "first"));
        assert!(!cache.fill("key", "second"));

        assert_eq!(cache.lookup("key"), Some("first".to_string()));
        assert_eq!(cache.stats().discarded_fills, 1);
    }

    #[test]
    fn test_whole_cache_expires_at_horizon() {
        let cache = SecretCache::with_refresh_interval("test", Duration::from_millis(50));
        cache.fill("a", "1");
        thread::sleep(Duration::from_millis(20));
        cache.fill("b", "2");

        thread::sleep(Duration::from_millis(40));

        // "b" is younger than the interval but goes with the rest
        assert_eq!(cache.lookup("b"), None);
        assert_eq!(cache.lookup("a"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_horizon_advances_after_expiry() {
        let cache = SecretCache::with_refresh_interval("test", Duration::from_millis(80));
        thread::sleep(Duration::from_millis(100));

        assert_eq!(cache.lookup("a"), None);
        cache.fill("a", "1");
        assert_eq!(cache.lookup("a"), Some("1".to_string()));
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_set_refresh_interval_expires_immediately() {
        let cache = SecretCache::new("test");
        cache.fill("a", "1");

        cache.set_refresh_interval(Duration::from_secs(1));
        assert_eq!(cache.refresh_interval(), Duration::from_secs(1));
        assert_eq!(cache.lookup("a"), None);
    }

    #[test]
    fn test_clear() {
        let cache = SecretCache::new("test");
        cache.fill("a", "1");
        cache.fill("b", "2");
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.stats().last_cleared.is_some());
    }

    #[test]
    fn test_stats() {
        let cache = SecretCache::new("test");
        cache.fill("secret", "value");

        cache.lookup("nonexistent");
        cache.lookup("secret");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.fills, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hit_rate(), 50.0);
    }

    #[test]
    fn test_stats_serialize() {
        let cache = SecretCache::new("test");
        cache.fill("secret", "value");

        let json = serde_json::to_value(cache.stats()).unwrap();
        assert_eq!(json["fills"], 1);
        assert_eq!(json["entries"], 1);
        assert!(json["last_cleared"].is_null());
    }

    #[test]
    fn test_concurrent_fills_keep_one_value() {
        let cache = Arc::new(SecretCache::new("test"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.fill("shared", &format!("value-{}", i)))
            })
            .collect();

        let stored = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|stored| *stored)
            .count();

        assert_eq!(stored, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_debug_hides_values() {
        let cache = SecretCache::new("test");
        cache.fill("a", "plaintext-secret");
        let debug = format!("{:?}", cache);
        assert!(!debug.contains("plaintext-secret"));
    }

    #[test]
    fn test_registry_hands_out_one_cache_per_kind() {
        let registry = CacheRegistry::with_refresh_interval(Duration::from_secs(30));

        let ps = registry.get(BackendKind::ParameterStore);
        assert!(Arc::ptr_eq(ps, registry.get(BackendKind::ParameterStore)));
        assert!(!Arc::ptr_eq(ps, registry.get(BackendKind::SecretsManager)));
        assert_eq!(ps.name(), "parameter-store");
        assert_eq!(ps.refresh_interval(), Duration::from_secs(30));

        ps.fill("/app/key", "value");
        assert!(registry.get(BackendKind::SecretsManager).is_empty());
    }
}
