use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use parking_lot::Mutex;
use std::sync::Arc;

use strata::errors::{ErrorKind, StrataError, StrataResult};
use strata::migration::LogEntry;
use strata::migration_log::MigrationLogProvider;

use crate::config::FjallLogConfig;
use crate::record::{decode_sequence, encode_sequence, to_strata_error, LogRecord};

/// Application log stored in a fjall partition.
///
/// Entries are keyed by a big-endian sequence number starting at 1, so a
/// partition scan returns them in the order they were appended.
#[derive(Clone)]
pub struct FjallMigrationLog {
    inner: Arc<FjallMigrationLogInner>,
}

struct FjallMigrationLogInner {
    keyspace: Keyspace,
    partition: PartitionHandle,
    config: FjallLogConfig,
    append_lock: Mutex<()>,
}

impl FjallMigrationLog {
    pub(crate) fn open(config: FjallLogConfig) -> StrataResult<FjallMigrationLog> {
        if config.db_path().is_empty() {
            log::error!("No fjall log path is configured");
            return Err(StrataError::new(
                "no fjall log path is configured",
                ErrorKind::ConfigurationError,
            ));
        }

        let keyspace = Keyspace::open(config.keyspace_config()).map_err(to_strata_error)?;
        let partition = keyspace
            .open_partition(config.partition_name(), PartitionCreateOptions::default())
            .map_err(to_strata_error)?;

        log::debug!(
            "Opened migration log partition {} at {}",
            config.partition_name(),
            config.db_path()
        );
        Ok(FjallMigrationLog {
            inner: Arc::new(FjallMigrationLogInner {
                keyspace,
                partition,
                config,
                append_lock: Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &FjallLogConfig {
        &self.inner.config
    }

    /// Number of recorded entries.
    pub fn len(&self) -> StrataResult<usize> {
        self.inner.partition.len().map_err(to_strata_error)
    }

    pub fn is_empty(&self) -> StrataResult<bool> {
        self.inner.partition.is_empty().map_err(to_strata_error)
    }

    /// Flushes the journal with a full fsync.
    pub fn persist(&self) -> StrataResult<()> {
        self.inner
            .keyspace
            .persist(PersistMode::SyncAll)
            .map_err(to_strata_error)
    }

    fn next_sequence(&self) -> StrataResult<u64> {
        match self.inner.partition.last_key_value().map_err(to_strata_error)? {
            Some((key, _)) => Ok(decode_sequence(&key)? + 1),
            None => Ok(1),
        }
    }
}

impl MigrationLogProvider for FjallMigrationLog {
    fn list_log(&self) -> StrataResult<Vec<LogEntry>> {
        let mut entries = Vec::new();
        for item in self.inner.partition.iter() {
            let (key, value) = item.map_err(to_strata_error)?;
            let sequence = decode_sequence(&key)?;
            let record = LogRecord::decode(&value)?;
            let entry = record.into_entry().map_err(|err| {
                log::error!("Invalid log entry at sequence {}: {}", sequence, err);
                StrataError::new_with_cause(
                    &format!("invalid log entry at sequence {}", sequence),
                    ErrorKind::InvalidLogEntry,
                    err,
                )
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn append(&self, entry: LogEntry) -> StrataResult<()> {
        let record = LogRecord::from_entry(&entry).encode()?;

        let _guard = self.inner.append_lock.lock();
        let sequence = self.next_sequence()?;
        self.inner
            .partition
            .insert(encode_sequence(sequence), record)
            .map_err(to_strata_error)?;

        if self.inner.config.sync_on_append() {
            self.persist()?;
        }
        log::debug!(
            "Recorded {} {} at sequence {}",
            entry.direction,
            entry.migration,
            sequence
        );
        Ok(())
    }
}
