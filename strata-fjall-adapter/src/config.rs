use fjall::Config;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use strata::common::DEFAULT_LOG_NAME;

/// Fjall log configuration.
///
/// Cloneable and shared: clones point at the same settings. Values are
/// fixed once the log is opened.
#[derive(Clone)]
pub struct FjallLogConfig {
    inner: Arc<FjallLogConfigInner>,
}

impl FjallLogConfig {
    #[inline]
    pub fn new() -> FjallLogConfig {
        FjallLogConfig {
            inner: Arc::new(FjallLogConfigInner::new()),
        }
    }

    /// Builds the fjall keyspace configuration from this config.
    pub(crate) fn keyspace_config(&self) -> Config {
        let mut config = Config::new(self.db_path()).cache_size(self.cache_size());
        if self.fsync_frequency() > 0 {
            config = config.fsync_ms(Some(self.fsync_frequency()));
        }
        config
    }

    #[inline]
    pub fn db_path(&self) -> &str {
        self.inner.db_path.get().map(String::as_str).unwrap_or("")
    }

    #[inline]
    pub(crate) fn set_db_path(&self, db_path: &str) {
        self.inner.db_path.get_or_init(|| db_path.to_string());
    }

    /// Returns the partition holding the log entries.
    #[inline]
    pub fn partition_name(&self) -> &str {
        self.inner
            .partition_name
            .get()
            .map(String::as_str)
            .unwrap_or(DEFAULT_LOG_NAME)
    }

    #[inline]
    pub(crate) fn set_partition_name(&self, name: &str) {
        self.inner.partition_name.get_or_init(|| name.to_string());
    }

    /// Whether every append is flushed to disk before returning.
    #[inline]
    pub fn sync_on_append(&self) -> bool {
        self.inner.sync_on_append.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_sync_on_append(&self, value: bool) {
        self.inner.sync_on_append.store(value, Ordering::Relaxed)
    }

    /// Background fsync interval in milliseconds, 0 to disable.
    #[inline]
    pub fn fsync_frequency(&self) -> u16 {
        self.inner.fsync_frequency.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_fsync_frequency(&self, ms: u16) {
        self.inner.fsync_frequency.store(ms, Ordering::Relaxed)
    }

    /// Block cache size in bytes.
    #[inline]
    pub fn cache_size(&self) -> u64 {
        self.inner.cache_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_cache_size(&self, bytes: u64) {
        self.inner.cache_size.store(bytes, Ordering::Relaxed)
    }
}

impl Default for FjallLogConfig {
    fn default() -> Self {
        Self::new()
    }
}

struct FjallLogConfigInner {
    db_path: OnceLock<String>,
    partition_name: OnceLock<String>,
    sync_on_append: AtomicBool,
    fsync_frequency: AtomicU16,
    cache_size: AtomicU64,
}

impl FjallLogConfigInner {
    /// Default block cache size: 8 MB. A migration log stays small.
    const DEFAULT_CACHE_MB: u64 = 8;

    fn new() -> FjallLogConfigInner {
        FjallLogConfigInner {
            db_path: OnceLock::new(),
            partition_name: OnceLock::new(),
            sync_on_append: AtomicBool::new(true),
            fsync_frequency: AtomicU16::new(0),
            cache_size: AtomicU64::new(Self::DEFAULT_CACHE_MB * 1_024 * 1_024),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FjallLogConfig::new();
        assert_eq!(config.db_path(), "");
        assert_eq!(config.partition_name(), "migrations_log");
        assert!(config.sync_on_append());
        assert_eq!(config.fsync_frequency(), 0);
        assert_eq!(config.cache_size(), 8 * 1024 * 1024);
    }

    #[test]
    fn test_paths_are_set_once() {
        let config = FjallLogConfig::new();
        config.set_db_path("/tmp/first");
        config.set_db_path("/tmp/second");
        assert_eq!(config.db_path(), "/tmp/first");

        config.set_partition_name("schema_history");
        config.set_partition_name("other");
        assert_eq!(config.partition_name(), "schema_history");
    }

    #[test]
    fn test_clones_share_settings() {
        let config = FjallLogConfig::new();
        let clone = config.clone();
        clone.set_sync_on_append(false);
        clone.set_fsync_frequency(100);
        assert!(!config.sync_on_append());
        assert_eq!(config.fsync_frequency(), 100);
    }
}
