use std::collections::BTreeMap;
use std::path::Path;

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, StrataError, StrataResult};

use super::file_system::{not_found, DirectoryEntry, EntryType, FileSystemProvider};

#[derive(Debug, Clone)]
struct MemoryNode {
    entry_type: EntryType,
    content: String,
}

/// In-memory file system keyed by slash separated paths.
///
/// Parent directories of every registered path exist implicitly. An explicit
/// node overrides the implied type, so a path can be registered as a
/// directory, a device or a symlink to exercise skip rules.
///
/// ```rust
/// use strata::source::{FileSystemProvider, MemoryFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new()
///     .with_file("migrations/V20211224091800_add_users_table.up.hmf", "create table users;");
/// let entries = fs.read_dir(Path::new("migrations")).unwrap();
/// assert_eq!(entries.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    nodes: Atomic<BTreeMap<String, MemoryNode>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        MemoryFileSystem {
            nodes: atomic(BTreeMap::new()),
        }
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.insert(path, EntryType::RegularFile, content);
        self
    }

    pub fn with_dir(self, path: &str) -> Self {
        self.insert(path, EntryType::Directory, "");
        self
    }

    pub fn with_entry(self, path: &str, entry_type: EntryType) -> Self {
        self.insert(path, entry_type, "");
        self
    }

    /// Registers or replaces a regular file.
    pub fn add_file(&self, path: &str, content: &str) {
        self.insert(path, EntryType::RegularFile, content);
    }

    /// Removes a registered path.
    pub fn remove(&self, path: &str) {
        let key = normalize(path);
        self.nodes.write_with(|nodes| nodes.remove(&key));
    }

    fn insert(&self, path: &str, entry_type: EntryType, content: &str) {
        let key = normalize(path);
        self.nodes.write_with(|nodes| {
            nodes.insert(
                key,
                MemoryNode {
                    entry_type,
                    content: content.to_string(),
                },
            )
        });
    }

    fn lookup(nodes: &BTreeMap<String, MemoryNode>, key: &str) -> Option<EntryType> {
        if key.is_empty() {
            return Some(EntryType::Directory);
        }
        if let Some(node) = nodes.get(key) {
            return Some(node.entry_type);
        }
        let prefix = format!("{}/", key);
        nodes
            .range(prefix.clone()..)
            .next()
            .filter(|(path, _)| path.starts_with(&prefix))
            .map(|_| EntryType::Directory)
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn key_of(path: &Path) -> String {
    normalize(&path.to_string_lossy().replace('\\', "/"))
}

impl FileSystemProvider for MemoryFileSystem {
    fn entry_type(&self, path: &Path) -> StrataResult<EntryType> {
        let key = key_of(path);
        self.nodes
            .read_with(|nodes| Self::lookup(nodes, &key))
            .ok_or_else(|| not_found(&key))
    }

    fn read_dir(&self, path: &Path) -> StrataResult<Vec<DirectoryEntry>> {
        let key = key_of(path);
        self.nodes.read_with(|nodes| {
            match Self::lookup(nodes, &key) {
                None => return Err(not_found(&key)),
                Some(EntryType::Directory) => {}
                Some(_) => {
                    return Err(StrataError::new(
                        &format!("{}: not a directory", key),
                        ErrorKind::NotADirectory,
                    ))
                }
            }

            let prefix = if key.is_empty() {
                String::new()
            } else {
                format!("{}/", key)
            };

            let mut children: BTreeMap<String, EntryType> = BTreeMap::new();
            for (node_path, node) in nodes.range(prefix.clone()..) {
                let Some(rest) = node_path.strip_prefix(&prefix) else {
                    break;
                };
                match rest.split_once('/') {
                    Some((child, _)) => {
                        children
                            .entry(child.to_string())
                            .or_insert(EntryType::Directory);
                    }
                    None => {
                        children.insert(rest.to_string(), node.entry_type);
                    }
                }
            }

            Ok(children
                .into_iter()
                .map(|(name, entry_type)| DirectoryEntry::new(&name, entry_type))
                .collect())
        })
    }

    fn read_to_string(&self, path: &Path) -> StrataResult<String> {
        let key = key_of(path);
        self.nodes.read_with(|nodes| match nodes.get(&key) {
            Some(node) if node.entry_type == EntryType::RegularFile => Ok(node.content.clone()),
            _ => match Self::lookup(nodes, &key) {
                Some(_) => Err(StrataError::new(
                    &format!("{}: not a regular file", key),
                    ErrorKind::InvalidOperation,
                )),
                None => Err(not_found(&key)),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_are_implied_directories() {
        let fs = MemoryFileSystem::new().with_file("tmp/.Xs223xxSCa/V20211224081255_initial.up.hmf", "");
        assert_eq!(fs.entry_type(Path::new("tmp")).unwrap(), EntryType::Directory);
        assert_eq!(
            fs.entry_type(Path::new("tmp/.Xs223xxSCa")).unwrap(),
            EntryType::Directory
        );
        assert_eq!(fs.entry_type(Path::new(".")).unwrap(), EntryType::Directory);
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let fs = MemoryFileSystem::new().with_dir("migrations");
        let err = fs.entry_type(Path::new("absent")).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FileNotFound);
        assert_eq!(
            fs.read_dir(Path::new("absent")).unwrap_err().kind(),
            &ErrorKind::FileNotFound
        );
    }

    #[test]
    fn test_read_dir_lists_direct_children_only() {
        let fs = MemoryFileSystem::new()
            .with_dir("migrations")
            .with_file("V20211224091100_init.up.hmf", "")
            .with_file("migrations/subdirectory/V20211224091100_init.up.hmf", "")
            .with_file("migrations/V20211224091800_add_users_table.up.hmf", "")
            .with_file("migrations-old/V20211224091800_add_users_table.up.hmf", "");

        let entries = fs.read_dir(Path::new("migrations")).unwrap();
        assert_eq!(
            entries,
            vec![
                DirectoryEntry::file("V20211224091800_add_users_table.up.hmf"),
                DirectoryEntry::directory("subdirectory"),
            ]
        );
    }

    #[test]
    fn test_explicit_nodes_keep_their_type() {
        let fs = MemoryFileSystem::new()
            .with_entry("migrations/V20211224091700_init.up.hmf", EntryType::Directory)
            .with_entry("dev/sda", EntryType::Other);

        let entries = fs.read_dir(Path::new("migrations")).unwrap();
        assert!(entries[0].is_directory());
        assert_eq!(fs.entry_type(Path::new("dev/sda")).unwrap(), EntryType::Other);
        assert_eq!(
            fs.read_dir(Path::new("dev/sda")).unwrap_err().kind(),
            &ErrorKind::NotADirectory
        );
    }

    #[test]
    fn test_read_to_string_returns_content() {
        let fs = MemoryFileSystem::new().with_file("m/a.up.hmf", "select 1;");
        assert_eq!(fs.read_to_string(Path::new("m/a.up.hmf")).unwrap(), "select 1;");
        assert_eq!(
            fs.read_to_string(Path::new("m")).unwrap_err().kind(),
            &ErrorKind::InvalidOperation
        );
        assert_eq!(
            fs.read_to_string(Path::new("m/b.up.hmf")).unwrap_err().kind(),
            &ErrorKind::FileNotFound
        );
    }

    #[test]
    fn test_read_to_string_on_explicit_directory_is_invalid() {
        let fs = MemoryFileSystem::new()
            .with_dir("migrations")
            .with_entry("dev/sda", EntryType::Other);
        assert_eq!(
            fs.read_to_string(Path::new("migrations")).unwrap_err().kind(),
            &ErrorKind::InvalidOperation
        );
        assert_eq!(
            fs.read_to_string(Path::new("dev")).unwrap_err().kind(),
            &ErrorKind::InvalidOperation
        );
        assert_eq!(
            fs.read_to_string(Path::new("dev/sda")).unwrap_err().kind(),
            &ErrorKind::InvalidOperation
        );
    }

    #[test]
    fn test_add_and_remove_files() {
        let fs = MemoryFileSystem::new().with_dir("m");
        fs.add_file("m/a.up.hmf", "");
        assert_eq!(fs.read_dir(Path::new("m")).unwrap().len(), 1);
        fs.remove("m/a.up.hmf");
        assert!(fs.read_dir(Path::new("m")).unwrap().is_empty());
    }
}
