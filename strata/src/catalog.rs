//! Migration catalog discovery.
//!
//! A catalog is built from a directory listing. Each regular file whose name
//! follows `V<14-digit-version>_<name>.<up|down>.hmf` contributes one script to
//! the [`Description`] of its version; every other entry is skipped. The
//! result is sorted ascending by version and holds each version once.
//!
//! ```rust
//! use strata::catalog::build_catalog;
//! use strata::source::DirectoryEntry;
//!
//! let catalog = build_catalog(&[
//!     DirectoryEntry::file("V20211224091800_add_users_table.up.hmf"),
//!     DirectoryEntry::file("V20211224091800_add_users_table.down.hmf"),
//!     DirectoryEntry::file("README.md"),
//! ])?;
//!
//! assert_eq!(catalog.len(), 1);
//! assert_eq!(catalog[0].version(), 20211224091800);
//! assert!(catalog[0].can_undo);
//! # Ok::<(), strata::errors::StrataError>(())
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::common::{DOWN_SUFFIX, MIGRATION_PREFIX, NAME_SEPARATOR, UP_SUFFIX, VERSION_LENGTH};
use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::migration::{Description, Direction, Migration, Version};
use crate::source::DirectoryEntry;

fn invalid_name(file_name: &str, reason: &str) -> StrataError {
    StrataError::new(
        &format!("migration file name is invalid: {} {}", file_name, reason),
        ErrorKind::InvalidFileName,
    )
}

/// Parses a migration file name into its identity and script direction.
///
/// Returns an [`ErrorKind::InvalidFileName`] error naming the first rule the
/// file name breaks.
pub fn parse_file_name(file_name: &str) -> StrataResult<(Migration, Direction)> {
    let rest = file_name
        .strip_prefix(MIGRATION_PREFIX)
        .ok_or_else(|| invalid_name(file_name, "does not start with V"))?;

    let (stem, direction) = if let Some(stem) = rest.strip_suffix(UP_SUFFIX) {
        (stem, Direction::Up)
    } else if let Some(stem) = rest.strip_suffix(DOWN_SUFFIX) {
        (stem, Direction::Down)
    } else {
        return Err(invalid_name(file_name, "has no recognized suffix"));
    };

    // at least one character must follow the version
    let (digits, tail) = match stem.char_indices().nth(VERSION_LENGTH) {
        Some((offset, _)) => stem.split_at(offset),
        None => return Err(invalid_name(file_name, "is too short")),
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_name(file_name, "does not contain a valid version"));
    }
    let version: Version = digits
        .parse()
        .map_err(|_| invalid_name(file_name, "does not contain a valid version"))?;

    let name = match tail.strip_prefix(NAME_SEPARATOR) {
        Some(name) => name,
        None => {
            return Err(invalid_name(
                file_name,
                "is missing an underscore after version",
            ))
        }
    };
    if name.is_empty() {
        return Err(invalid_name(file_name, "is missing name section"));
    }

    Ok((Migration::new(version, name), direction))
}

/// Accumulates migration scripts into a catalog, merging by version.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    migrations: BTreeMap<Version, Description>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        CatalogBuilder {
            migrations: BTreeMap::new(),
        }
    }

    /// Records one script.
    ///
    /// The first script of a version creates its description. A later script
    /// with the same name can only turn `can_undo` on; one with a different
    /// name fails with [`ErrorKind::DuplicateVersion`].
    pub fn add(&mut self, migration: Migration, direction: Direction) -> StrataResult<()> {
        match self.migrations.entry(migration.version) {
            Entry::Vacant(slot) => {
                slot.insert(Description::new(migration, direction == Direction::Down));
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.migration.name != migration.name {
                    log::error!(
                        "Version {} is defined as both \"{}\" and \"{}\"",
                        migration.version,
                        existing.migration.name,
                        migration.name
                    );
                    return Err(StrataError::new(
                        &format!(
                            "migration version already exists with different name: version {} has conflicting names: \"{}\" and \"{}\"",
                            migration.version, existing.migration.name, migration.name
                        ),
                        ErrorKind::DuplicateVersion,
                    ));
                }
                if direction == Direction::Down {
                    existing.can_undo = true;
                }
            }
        }
        Ok(())
    }

    /// Records a directory entry if it is a well-formed migration script.
    ///
    /// Entries that are not regular files or that break the naming convention
    /// are skipped and leave the builder untouched.
    pub fn add_entry(&mut self, entry: &DirectoryEntry) -> StrataResult<()> {
        if !entry.is_regular_file() {
            log::debug!("Skipping {}: not a regular file", entry.name());
            return Ok(());
        }

        match parse_file_name(entry.name()) {
            Ok((migration, direction)) => self.add(migration, direction),
            Err(err) => {
                log::debug!("Skipping {}", err.message());
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Returns the catalog, ascending by version.
    pub fn build(self) -> Vec<Description> {
        self.migrations.into_values().collect()
    }
}

/// Builds a catalog from a directory listing, in listing order.
///
/// Fails as a whole on the first version conflict; no partial catalog is
/// returned.
pub fn build_catalog(entries: &[DirectoryEntry]) -> StrataResult<Vec<Description>> {
    let mut builder = CatalogBuilder::new();
    for entry in entries {
        builder.add_entry(entry)?;
    }
    log::debug!(
        "Discovered {} migrations in {} directory entries",
        builder.len(),
        entries.len()
    );
    Ok(builder.build())
}
