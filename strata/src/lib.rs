//! # Strata - Migration Catalog and State Reconciliation
//!
//! Strata discovers database schema migrations from a directory of scripts
//! and tells which of them are pending, applied or missing by replaying the
//! application log recorded by the database.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata::strata::Strata;
//! use strata::migration::Status;
//!
//! let strata = Strata::builder()
//!     .migrations_dir("db/migrations")
//!     .migration_log(log)
//!     .open()?;
//!
//! let result = strata.validate()?;
//! println!(
//!     "{} applied, {} pending, {} missing",
//!     result.applied_count, result.pending_count, result.missing_count
//! );
//! ```
//!
//! ## Naming Convention
//!
//! Scripts are named `V<14-digit-version>_<name>.<up|down>.hmf`, for example
//! `V20211224091800_add_users_table.up.hmf`. Entries that do not follow the
//! convention are ignored.
//!
//! ## Module Organization
//!
//! - [`catalog`] - Parsing script names and building the catalog
//! - [`common`] - Constants and shared utilities
//! - [`errors`] - Error types and result definitions
//! - [`migration`] - Value types shared by every component
//! - [`migration_log`] - The application-log collaborator
//! - [`reconciler`] - Replaying the log against the catalog
//! - [`source`] - Migration sources and the directory-listing collaborator
//! - [`strata`] - The entry point
//! - [`strata_builder`] - Builder for the entry point
//! - [`strata_config`] - Configuration

pub mod catalog;
pub mod common;
pub mod errors;
pub mod migration;
pub mod migration_log;
pub mod reconciler;
pub mod source;
pub mod strata;
pub mod strata_builder;
pub mod strata_config;
