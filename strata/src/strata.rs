//! The entry point tying a migration source to an application log.

use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::migration_log::MigrationLog;
use crate::migration::ValidationResult;
use crate::reconciler::reconcile;
use crate::source::{FilesSource, MigrationSource};
use crate::strata_builder::StrataBuilder;
use crate::strata_config::StrataConfig;

/// Reports which migrations are pending, applied or missing.
///
/// Each call to [`validate`](Strata::validate) reads a fresh catalog and a
/// fresh log; nothing is cached between calls, so one instance can serve
/// concurrent callers.
///
/// # Examples
///
/// ```rust,ignore
/// use strata::strata::Strata;
///
/// let strata = Strata::builder()
///     .migrations_dir("db/migrations")
///     .migration_log(log)
///     .open()?;
///
/// let result = strata.validate()?;
/// for state in &result.migrations {
///     println!("{} {}", state.description.migration, state.status);
/// }
/// ```
#[derive(Clone)]
pub struct Strata {
    source: MigrationSource,
    migration_log: MigrationLog,
}

impl Strata {
    /// Creates an instance from explicit collaborators.
    pub fn new(source: MigrationSource, migration_log: MigrationLog) -> Self {
        Strata {
            source,
            migration_log,
        }
    }

    pub fn builder() -> StrataBuilder {
        StrataBuilder::new()
    }

    pub(crate) fn open(config: StrataConfig) -> StrataResult<Strata> {
        let migrations_dir = config.migrations_dir().ok_or_else(|| {
            log::error!("No migrations directory is configured");
            StrataError::new(
                "no migrations directory is configured",
                ErrorKind::ConfigurationError,
            )
        })?;
        let migration_log = config.migration_log()?;
        let source = FilesSource::new(config.file_system(), &migrations_dir)?;

        log::debug!("Opened migrations directory {}", migrations_dir.display());
        Ok(Strata::new(MigrationSource::new(source), migration_log))
    }

    pub fn source(&self) -> &MigrationSource {
        &self.source
    }

    pub fn migration_log(&self) -> &MigrationLog {
        &self.migration_log
    }

    /// Reconciles the current catalog against the current application log.
    ///
    /// # Errors
    ///
    /// Fails without a partial result if either collaborator fails; the
    /// collaborator's error is kept as the cause.
    pub fn validate(&self) -> StrataResult<ValidationResult> {
        let available = self.source.available_migrations().map_err(|err| {
            log::error!("Failed to get the list of available migrations: {}", err);
            StrataError::new_with_cause(
                "failed to get the list of available migrations",
                ErrorKind::SourceError,
                err,
            )
        })?;

        let applied = self.migration_log.list_log().map_err(|err| {
            log::error!("Failed to get the list of applied migrations: {}", err);
            StrataError::new_with_cause(
                "failed to get the list of applied migrations",
                ErrorKind::LogError,
                err,
            )
        })?;

        Ok(reconcile(&available, &applied))
    }
}
