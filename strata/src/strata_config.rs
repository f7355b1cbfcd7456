//! Configuration for a [`Strata`](crate::strata::Strata) instance.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::migration_log::MigrationLog;
use crate::source::FileSystem;

/// Collaborators and locations used to open a [`Strata`](crate::strata::Strata).
///
/// Every field can be set once. Clones share the same settings.
#[derive(Clone, Default)]
pub struct StrataConfig {
    inner: Arc<StrataConfigInner>,
}

impl StrataConfig {
    pub fn new() -> Self {
        StrataConfig {
            inner: Arc::new(StrataConfigInner::default()),
        }
    }

    /// Sets the directory holding the migration scripts.
    ///
    /// # Errors
    ///
    /// Returns error if the path is empty or was already set.
    pub fn set_migrations_dir(&self, migrations_dir: &Path) -> StrataResult<()> {
        self.inner.set_migrations_dir(migrations_dir)
    }

    pub fn migrations_dir(&self) -> Option<PathBuf> {
        self.inner.migrations_dir.get().cloned()
    }

    /// Sets the directory-listing collaborator.
    ///
    /// # Errors
    ///
    /// Returns error if a file system was already set.
    pub fn set_file_system(&self, file_system: FileSystem) -> StrataResult<()> {
        self.inner.set_file_system(file_system)
    }

    /// Returns the configured file system, or the OS file system if none was set.
    pub fn file_system(&self) -> FileSystem {
        self.inner.file_system.get().cloned().unwrap_or_default()
    }

    /// Sets the application-log collaborator.
    ///
    /// # Errors
    ///
    /// Returns error if a log was already set.
    pub fn set_migration_log(&self, migration_log: MigrationLog) -> StrataResult<()> {
        self.inner.set_migration_log(migration_log)
    }

    /// Gets the configured application log.
    ///
    /// # Errors
    ///
    /// Returns error if no log is configured.
    pub fn migration_log(&self) -> StrataResult<MigrationLog> {
        self.inner.migration_log.get().cloned().ok_or_else(|| {
            log::error!("No migration log is configured");
            StrataError::new(
                "no migration log is configured",
                ErrorKind::ConfigurationError,
            )
        })
    }
}

#[derive(Default)]
struct StrataConfigInner {
    migrations_dir: OnceLock<PathBuf>,
    file_system: OnceLock<FileSystem>,
    migration_log: OnceLock<MigrationLog>,
}

fn already_set(field: &str) -> StrataError {
    log::error!("{} can only be configured once", field);
    StrataError::new(
        &format!("{} can only be configured once", field),
        ErrorKind::InvalidOperation,
    )
}

impl StrataConfigInner {
    fn set_migrations_dir(&self, migrations_dir: &Path) -> StrataResult<()> {
        if migrations_dir.as_os_str().is_empty() {
            log::error!("Migrations directory cannot be empty");
            return Err(StrataError::new(
                "migrations directory cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        self.migrations_dir
            .set(migrations_dir.to_path_buf())
            .map_err(|_| already_set("migrations directory"))
    }

    fn set_file_system(&self, file_system: FileSystem) -> StrataResult<()> {
        self.file_system
            .set(file_system)
            .map_err(|_| already_set("file system"))
    }

    fn set_migration_log(&self, migration_log: MigrationLog) -> StrataResult<()> {
        self.migration_log
            .set(migration_log)
            .map_err(|_| already_set("migration log"))
    }
}
