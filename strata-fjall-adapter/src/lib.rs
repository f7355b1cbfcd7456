//! Persistent migration log for strata, stored in a fjall keyspace.
//!
//! ```rust,ignore
//! use strata::strata::Strata;
//! use strata_fjall_adapter::FjallLogModule;
//!
//! let log = FjallLogModule::with_config()
//!     .db_path("/var/lib/app/migrations-log")
//!     .build()
//!     .open()?;
//!
//! let strata = Strata::builder()
//!     .migrations_dir("db/migrations")
//!     .migration_log(log)
//!     .open()?;
//! ```

mod config;
mod log_store;
mod module;
mod record;

pub use config::FjallLogConfig;
pub use log_store::FjallMigrationLog;
pub use module::{FjallLogModule, FjallLogModuleBuilder};
pub use record::{FjallLogError, FjallLogResult};
