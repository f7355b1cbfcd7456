//! The application log: the chronological record of every script run.

mod memory;

pub use memory::MemoryMigrationLog;

use std::ops::Deref;
use std::sync::Arc;

use crate::errors::StrataResult;
use crate::migration::LogEntry;

/// Persistent record of migration runs.
///
/// # Ordering
/// [`list_log`](MigrationLogProvider::list_log) must return entries in the
/// store's own insertion sequence. Reconciliation replays them in that order,
/// never by `applied_at`.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`.
pub trait MigrationLogProvider: Send + Sync {
    /// Returns every recorded entry in insertion order.
    fn list_log(&self) -> StrataResult<Vec<LogEntry>>;

    /// Appends one entry at the end of the log.
    fn append(&self, entry: LogEntry) -> StrataResult<()>;
}

/// Shared handle to a [`MigrationLogProvider`].
#[derive(Clone)]
pub struct MigrationLog {
    inner: Arc<dyn MigrationLogProvider>,
}

impl MigrationLog {
    pub fn new<T: MigrationLogProvider + 'static>(inner: T) -> Self {
        MigrationLog {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for MigrationLog {
    type Target = Arc<dyn MigrationLogProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
