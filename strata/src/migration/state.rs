use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};

use super::types::{Description, Version};

/// Reconciled status of one migration version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Defined but not currently applied
    Pending,
    /// Applied, last log event was a forward run
    Applied,
    /// Present in the log but its definition is gone
    Missing,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Applied => write!(f, "applied"),
            Status::Missing => write!(f, "missing"),
        }
    }
}

/// Current state of one migration version.
///
/// `applied_at` is only set while the last log event for the version is a
/// forward run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    pub description: Description,
    pub status: Status,
    pub applied_at: Option<DateTime<Utc>>,
}

impl State {
    pub fn new(description: Description, status: Status, applied_at: Option<DateTime<Utc>>) -> Self {
        State {
            description,
            status,
            applied_at,
        }
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.description.version()
    }
}

/// Outcome of reconciling the catalog against the application log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationResult {
    /// One state per version, ascending by version.
    pub migrations: Vec<State>,
    pub applied_count: usize,
    pub pending_count: usize,
    pub missing_count: usize,
}

impl ValidationResult {
    /// `true` when no logged migration has lost its definition.
    pub fn is_consistent(&self) -> bool {
        self.missing_count == 0
    }

    pub fn pending(&self) -> impl Iterator<Item = &State> {
        self.with_status(Status::Pending)
    }

    pub fn applied(&self) -> impl Iterator<Item = &State> {
        self.with_status(Status::Applied)
    }

    pub fn missing(&self) -> impl Iterator<Item = &State> {
        self.with_status(Status::Missing)
    }

    pub fn get(&self, version: Version) -> Option<&State> {
        self.migrations
            .binary_search_by_key(&version, |state| state.version())
            .ok()
            .map(|index| &self.migrations[index])
    }

    fn with_status(&self, status: Status) -> impl Iterator<Item = &State> {
        self.migrations.iter().filter(move |state| state.status == status)
    }
}
