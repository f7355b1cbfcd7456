//! Value types shared by catalog discovery and state reconciliation.
//!
//! Everything here is an immutable value object: a [`Migration`] identity,
//! the [`Description`] the catalog builds for it, the [`LogEntry`] events read
//! from the application log and the [`State`] / [`ValidationResult`] the
//! reconciler produces.

mod state;
mod types;

pub use state::{State, Status, ValidationResult};
pub use types::{Description, Direction, LogEntry, Migration, Version};
