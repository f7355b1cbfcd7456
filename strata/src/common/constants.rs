/// Every migration file name starts with this prefix.
pub const MIGRATION_PREFIX: &str = "V";

/// Number of decimal digits in the version part of a file name.
pub const VERSION_LENGTH: usize = 14;

/// Largest version that fits in the version part of a file name.
pub const MAX_VERSION: u64 = 99_999_999_999_999;

/// Separates the version from the migration name.
pub const NAME_SEPARATOR: char = '_';

/// Extension shared by all migration scripts.
pub const MIGRATION_EXTENSION: &str = "hmf";

/// Suffix of a forward script.
pub const UP_SUFFIX: &str = ".up.hmf";

/// Suffix of a reverse script.
pub const DOWN_SUFFIX: &str = ".down.hmf";

/// Partition used by persistent logs when none is configured.
pub const DEFAULT_LOG_NAME: &str = "migrations_log";
