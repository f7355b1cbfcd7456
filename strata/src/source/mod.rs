//! Migration sources and the directory-listing collaborator they read from.

mod file_system;
mod files;
mod memory_fs;

pub use file_system::{DirectoryEntry, EntryType, FileSystem, FileSystemProvider, OsFileSystem};
pub use files::FilesSource;
pub use memory_fs::MemoryFileSystem;

use std::ops::Deref;
use std::sync::Arc;

use crate::errors::StrataResult;
use crate::migration::{Description, Direction, Migration};

/// Provider of migration definitions.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; a source may be shared by concurrent
/// validations.
pub trait MigrationSourceProvider: Send + Sync {
    /// Returns the catalog: every defined migration, ascending by version.
    fn available_migrations(&self) -> StrataResult<Vec<Description>>;

    /// Returns the script text of one direction of a migration.
    fn read_migration(&self, migration: &Migration, direction: Direction) -> StrataResult<String>;
}

/// Shared handle to a [`MigrationSourceProvider`].
#[derive(Clone)]
pub struct MigrationSource {
    inner: Arc<dyn MigrationSourceProvider>,
}

impl MigrationSource {
    pub fn new<T: MigrationSourceProvider + 'static>(inner: T) -> Self {
        MigrationSource {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for MigrationSource {
    type Target = Arc<dyn MigrationSourceProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
