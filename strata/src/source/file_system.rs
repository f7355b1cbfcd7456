use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{ErrorKind, StrataError, StrataResult};

/// Kind of a file system entry as reported by the listing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Directory,
    RegularFile,
    Symlink,
    /// Devices, sockets, pipes and anything else that is not a plain file
    Other,
}

impl EntryType {
    pub(crate) fn from_std(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryType::Directory
        } else if file_type.is_file() {
            EntryType::RegularFile
        } else if file_type.is_symlink() {
            EntryType::Symlink
        } else {
            EntryType::Other
        }
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    name: String,
    entry_type: EntryType,
}

impl DirectoryEntry {
    pub fn new(name: &str, entry_type: EntryType) -> Self {
        DirectoryEntry {
            name: name.to_string(),
            entry_type,
        }
    }

    pub fn file(name: &str) -> Self {
        DirectoryEntry::new(name, EntryType::RegularFile)
    }

    pub fn directory(name: &str) -> Self {
        DirectoryEntry::new(name, EntryType::Directory)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_directory(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn is_regular_file(&self) -> bool {
        self.entry_type == EntryType::RegularFile
    }
}

/// Directory-listing collaborator.
///
/// Implementations answer three questions about a path: what it is, what a
/// directory contains, and what a file holds. Missing paths are reported as
/// [`ErrorKind::FileNotFound`].
pub trait FileSystemProvider: Send + Sync {
    /// Returns the type of the entry at `path`, following symlinks.
    fn entry_type(&self, path: &Path) -> StrataResult<EntryType>;

    /// Lists the direct children of the directory at `path`.
    ///
    /// Child entries are reported without following symlinks.
    fn read_dir(&self, path: &Path) -> StrataResult<Vec<DirectoryEntry>>;

    /// Reads the whole file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> StrataResult<String>;
}

/// Shared handle to a [`FileSystemProvider`].
#[derive(Clone)]
pub struct FileSystem {
    inner: Arc<dyn FileSystemProvider>,
}

impl FileSystem {
    pub fn new<T: FileSystemProvider + 'static>(inner: T) -> Self {
        FileSystem {
            inner: Arc::new(inner),
        }
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        FileSystem::new(OsFileSystem)
    }
}

impl Deref for FileSystem {
    type Target = Arc<dyn FileSystemProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// File system backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystemProvider for OsFileSystem {
    fn entry_type(&self, path: &Path) -> StrataResult<EntryType> {
        let metadata = fs::metadata(path)?;
        Ok(EntryType::from_std(metadata.file_type()))
    }

    fn read_dir(&self, path: &Path) -> StrataResult<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            match entry.file_name().into_string() {
                Ok(name) => entries.push(DirectoryEntry::new(&name, EntryType::from_std(file_type))),
                Err(raw) => {
                    log::debug!("Skipping non UTF-8 entry {:?} in {}", raw, path.display());
                }
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> StrataResult<String> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8(bytes)?)
    }
}

pub(crate) fn not_found(path: &str) -> StrataError {
    StrataError::new(
        &format!("{}: no such file or directory", path),
        ErrorKind::FileNotFound,
    )
}
