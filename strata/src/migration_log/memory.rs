use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::StrataResult;
use crate::migration::LogEntry;

use super::MigrationLogProvider;

/// Volatile application log kept in memory.
///
/// Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryMigrationLog {
    entries: Atomic<Vec<LogEntry>>,
}

impl MemoryMigrationLog {
    pub fn new() -> Self {
        MemoryMigrationLog {
            entries: atomic(Vec::new()),
        }
    }

    /// Creates a log pre-filled with `entries`, kept in the given order.
    pub fn with_entries(entries: Vec<LogEntry>) -> Self {
        MemoryMigrationLog {
            entries: atomic(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read_with(|entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MigrationLogProvider for MemoryMigrationLog {
    fn list_log(&self) -> StrataResult<Vec<LogEntry>> {
        Ok(self.entries.read_with(|entries| entries.clone()))
    }

    fn append(&self, entry: LogEntry) -> StrataResult<()> {
        self.entries.write_with(|entries| entries.push(entry));
        Ok(())
    }
}
