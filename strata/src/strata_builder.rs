use std::path::Path;

use crate::errors::{StrataError, StrataResult};
use crate::migration_log::{MigrationLog, MigrationLogProvider};
use crate::source::{FileSystem, FileSystemProvider};
use crate::strata::Strata;
use crate::strata_config::StrataConfig;

/// Builder for a [`Strata`] instance reading scripts from a directory.
///
/// Configuration errors are captured as they happen and returned by
/// [`open`](StrataBuilder::open).
///
/// # Examples
///
/// ```rust
/// use strata::migration_log::MemoryMigrationLog;
/// use strata::source::MemoryFileSystem;
/// use strata::strata::Strata;
///
/// let fs = MemoryFileSystem::new()
///     .with_file("migrations/V20211224081255_initial.up.hmf", "create table t (id int);");
///
/// let strata = Strata::builder()
///     .migrations_dir("migrations")
///     .file_system(fs)
///     .migration_log(MemoryMigrationLog::new())
///     .open()?;
///
/// let result = strata.validate()?;
/// assert_eq!(result.pending_count, 1);
/// # Ok::<(), strata::errors::StrataError>(())
/// ```
#[derive(Default)]
pub struct StrataBuilder {
    error: Option<StrataError>,
    config: StrataConfig,
}

impl StrataBuilder {
    pub fn new() -> Self {
        StrataBuilder {
            error: None,
            config: StrataConfig::new(),
        }
    }

    /// Sets the directory holding the migration scripts.
    pub fn migrations_dir<P: AsRef<Path>>(mut self, migrations_dir: P) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_migrations_dir(migrations_dir.as_ref()) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Replaces the OS file system used to list the migrations directory.
    pub fn file_system<T: FileSystemProvider + 'static>(mut self, file_system: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_file_system(FileSystem::new(file_system)) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the application log the catalog is reconciled against.
    pub fn migration_log<T: MigrationLogProvider + 'static>(mut self, migration_log: T) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_migration_log(MigrationLog::new(migration_log)) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Validates the configuration and opens the migrations directory.
    ///
    /// # Errors
    ///
    /// Returns the first captured configuration error, or the error raised
    /// while checking the migrations directory.
    pub fn open(self) -> StrataResult<Strata> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Strata::open(self.config)
    }
}
