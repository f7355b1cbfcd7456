use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};

use crate::common::{MAX_VERSION, MIGRATION_EXTENSION, MIGRATION_PREFIX};
use crate::errors::{ErrorKind, StrataError, StrataResult};

/// Unique ordering key of a migration, parsed from the 14-digit file prefix.
pub type Version = u64;

/// Direction of a migration script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Forward script
    Up,
    /// Reverse script
    Down,
}

impl Direction {
    /// Single-character code used by persistent logs.
    pub fn code(&self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
        }
    }

    /// Parses a log direction code, ignoring case.
    pub fn from_code(code: char) -> StrataResult<Direction> {
        match code.to_ascii_lowercase() {
            'u' => Ok(Direction::Up),
            'd' => Ok(Direction::Down),
            other => Err(StrataError::new(
                &format!("direction \"{}\" is unknown", other),
                ErrorKind::InvalidLogEntry,
            )),
        }
    }

    /// Label used inside migration file names.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A migration identity: its version and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Migration {
    pub version: Version,
    pub name: String,
}

impl Migration {
    pub fn new(version: Version, name: &str) -> Self {
        Migration {
            version,
            name: name.to_string(),
        }
    }

    /// Renders the canonical script file name for `direction`.
    ///
    /// ```rust
    /// use strata::migration::{Direction, Migration};
    ///
    /// let migration = Migration::new(20211224091800, "add_users_table");
    /// assert_eq!(
    ///     migration.file_name(Direction::Down)?,
    ///     "V20211224091800_add_users_table.down.hmf"
    /// );
    /// # Ok::<(), strata::errors::StrataError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidOperation`] if the version needs more than
    /// 14 digits, since no valid file name could hold it.
    pub fn file_name(&self, direction: Direction) -> StrataResult<String> {
        if self.version > MAX_VERSION {
            log::error!("Version of {} does not fit in a file name", self);
            return Err(StrataError::new(
                &format!(
                    "version {} of migration {} has more than 14 digits",
                    self.version, self.name
                ),
                ErrorKind::InvalidOperation,
            ));
        }

        Ok(format!(
            "{}{:014}_{}.{}.{}",
            MIGRATION_PREFIX,
            self.version,
            self.name,
            direction.label(),
            MIGRATION_EXTENSION
        ))
    }
}

impl Display for Migration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:014}_{}", self.version, self.name)
    }
}

/// A discovered migration definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Description {
    pub migration: Migration,
    /// Whether a reverse script exists for this version.
    pub can_undo: bool,
}

impl Description {
    pub fn new(migration: Migration, can_undo: bool) -> Self {
        Description {
            migration,
            can_undo,
        }
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.migration.version
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.migration.name
    }
}

/// One historical application event read from the application log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub migration: Migration,
    pub direction: Direction,
    pub applied_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(migration: Migration, direction: Direction, applied_at: DateTime<Utc>) -> Self {
        LogEntry {
            migration,
            direction,
            applied_at,
        }
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.migration.version
    }
}
