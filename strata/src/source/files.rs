use std::path::{Path, PathBuf};

use crate::catalog::build_catalog;
use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::migration::{Description, Direction, Migration};

use super::file_system::{EntryType, FileSystem};
use super::MigrationSourceProvider;

/// Migration source reading scripts from one directory.
///
/// Only the direct children of the directory are considered; subdirectories
/// and their content are ignored.
#[derive(Clone)]
pub struct FilesSource {
    migrations_dir: PathBuf,
    file_system: FileSystem,
}

impl FilesSource {
    /// Opens a source rooted at `migrations_dir`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::ConfigurationError`] if the directory cannot be found,
    ///   with the listing error as cause.
    /// - [`ErrorKind::NotADirectory`] if the path is a file, a device or any
    ///   other non-directory entry.
    pub fn new<P: AsRef<Path>>(file_system: FileSystem, migrations_dir: P) -> StrataResult<Self> {
        let migrations_dir = migrations_dir.as_ref().to_path_buf();

        let entry_type = file_system.entry_type(&migrations_dir).map_err(|err| {
            log::error!(
                "Failed to stat migrations directory {}: {}",
                migrations_dir.display(),
                err
            );
            StrataError::new_with_cause(
                "failed to stat migrations directory",
                ErrorKind::ConfigurationError,
                err,
            )
        })?;

        if entry_type != EntryType::Directory {
            log::error!(
                "Migrations directory {} is a {:?}, not a directory",
                migrations_dir.display(),
                entry_type
            );
            return Err(StrataError::new(
                &format!(
                    "migrations directory {} is not a directory",
                    migrations_dir.display()
                ),
                ErrorKind::NotADirectory,
            ));
        }

        Ok(FilesSource {
            migrations_dir,
            file_system,
        })
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Path of the script for `migration` in `direction`.
    ///
    /// # Errors
    ///
    /// Returns error if the version cannot be rendered in a file name.
    pub fn script_path(&self, migration: &Migration, direction: Direction) -> StrataResult<PathBuf> {
        Ok(self.migrations_dir.join(migration.file_name(direction)?))
    }
}

impl MigrationSourceProvider for FilesSource {
    fn available_migrations(&self) -> StrataResult<Vec<Description>> {
        let entries = self
            .file_system
            .read_dir(&self.migrations_dir)
            .map_err(|err| {
                StrataError::new_with_cause(
                    "failed to read contents of migrations directory",
                    ErrorKind::SourceError,
                    err,
                )
            })?;

        build_catalog(&entries).map_err(|err| {
            StrataError::new_with_cause(
                "failed to parse directory entries",
                err.kind().clone(),
                err,
            )
        })
    }

    fn read_migration(&self, migration: &Migration, direction: Direction) -> StrataResult<String> {
        let path = self.script_path(migration, direction).map_err(|err| {
            StrataError::new_with_cause(
                &format!("failed to locate migration script for {}", migration),
                ErrorKind::SourceError,
                err,
            )
        })?;
        self.file_system.read_to_string(&path).map_err(|err| {
            StrataError::new_with_cause(
                &format!("failed to read migration script {}", path.display()),
                ErrorKind::SourceError,
                err,
            )
        })
    }
}
