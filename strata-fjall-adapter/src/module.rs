use crate::config::FjallLogConfig;
use crate::log_store::FjallMigrationLog;
use strata::errors::StrataResult;

/// Factory for a fjall-backed [`FjallMigrationLog`].
///
/// # Examples
///
/// ```rust,ignore
/// use strata_fjall_adapter::FjallLogModule;
///
/// let log = FjallLogModule::with_config()
///     .db_path("/path/to/log")
///     .partition_name("schema_history")
///     .build()
///     .open()?;
/// ```
pub struct FjallLogModule {
    log_config: FjallLogConfig,
}

impl FjallLogModule {
    #[inline]
    pub fn with_config() -> FjallLogModuleBuilder {
        FjallLogModuleBuilder::new()
    }

    pub fn config(&self) -> &FjallLogConfig {
        &self.log_config
    }

    /// Opens or creates the keyspace and the log partition.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no path is set, or the fjall error
    /// raised while opening the keyspace.
    pub fn open(&self) -> StrataResult<FjallMigrationLog> {
        FjallMigrationLog::open(self.log_config.clone())
    }
}

/// Builder for [`FjallLogModule`].
pub struct FjallLogModuleBuilder {
    log_config: FjallLogConfig,
}

impl FjallLogModuleBuilder {
    fn new() -> Self {
        FjallLogModuleBuilder {
            log_config: FjallLogConfig::new(),
        }
    }

    /// Directory of the fjall keyspace. Required.
    pub fn db_path(self, db_path: &str) -> Self {
        self.log_config.set_db_path(db_path);
        self
    }

    /// Partition name, `migrations_log` by default.
    pub fn partition_name(self, name: &str) -> Self {
        self.log_config.set_partition_name(name);
        self
    }

    /// Flushes every append with a full fsync. On by default.
    pub fn sync_on_append(self, value: bool) -> Self {
        self.log_config.set_sync_on_append(value);
        self
    }

    pub fn fsync_frequency(self, ms: u16) -> Self {
        self.log_config.set_fsync_frequency(ms);
        self
    }

    pub fn cache_size(self, bytes: u64) -> Self {
        self.log_config.set_cache_size(bytes);
        self
    }

    pub fn build(self) -> FjallLogModule {
        FjallLogModule {
            log_config: self.log_config,
        }
    }
}
