use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for Strata operations.
///
/// Each kind names one failure class so callers can tell a broken setup apart
/// from a conflicting catalog or a failing log store.
///
/// # Examples
///
/// ```rust,ignore
/// use strata::errors::{StrataError, ErrorKind, StrataResult};
///
/// fn example() -> StrataResult<()> {
///     Err(StrataError::new("migrations directory is missing", ErrorKind::ConfigurationError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Setup Errors
    /// The configured location or option is unusable
    ConfigurationError,
    /// The configured migrations root exists but is not a directory
    NotADirectory,

    // Catalog Errors
    /// A file name does not follow the migration naming convention
    InvalidFileName,
    /// Two definitions share a version but disagree on the name
    DuplicateVersion,
    /// The migration source could not produce a catalog
    SourceError,

    // Log Errors
    /// The application log could not be read or written
    LogError,
    /// A stored log entry is malformed
    InvalidLogEntry,

    // IO Errors
    /// Generic IO error
    IOError,
    /// The file or directory was not found
    FileNotFound,
    /// Permission denied for file operation
    PermissionDenied,
    /// Error encoding or decoding data
    EncodingError,
    /// Error from a storage backend
    BackendError,

    /// The operation is not valid in the current context
    InvalidOperation,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::NotADirectory => write!(f, "Not a directory"),
            ErrorKind::InvalidFileName => write!(f, "Invalid file name"),
            ErrorKind::DuplicateVersion => write!(f, "Duplicate version"),
            ErrorKind::SourceError => write!(f, "Source error"),
            ErrorKind::LogError => write!(f, "Log error"),
            ErrorKind::InvalidLogEntry => write!(f, "Invalid log entry"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom Strata error type.
///
/// `StrataError` carries a message, a kind and an optional cause, so a failure
/// deep inside a collaborator surfaces with the context of every layer it
/// passed through.
///
/// # Examples
///
/// ```rust,ignore
/// use strata::errors::{StrataError, ErrorKind};
///
/// let cause = StrataError::new("disk unplugged", ErrorKind::IOError);
/// let err = StrataError::new_with_cause(
///     "failed to get the list of applied migrations",
///     ErrorKind::LogError,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct StrataError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StrataError>>,
    backtrace: Atomic<Backtrace>,
}

impl StrataError {
    /// Creates a new `StrataError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StrataError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `StrataError` that wraps `cause`.
    ///
    /// The cause stays reachable through [`StrataError::cause`] and
    /// [`Error::source`].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StrataError) -> Self {
        StrataError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StrataError> {
        self.cause.as_deref()
    }

    /// Walks the cause chain and returns the innermost error.
    pub fn root_cause(&self) -> &StrataError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl Display for StrataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.message, cause),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Debug for StrataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for StrataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Strata operations.
pub type StrataResult<T> = Result<T, StrataError>;

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IOError,
        };
        StrataError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<std::string::FromUtf8Error> for StrataError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        StrataError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::num::ParseIntError> for StrataError {
    fn from(err: std::num::ParseIntError) -> Self {
        StrataError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidFileName,
        )
    }
}

impl From<String> for StrataError {
    fn from(msg: String) -> Self {
        StrataError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for StrataError {
    fn from(msg: &str) -> Self {
        StrataError::new(msg, ErrorKind::InternalError)
    }
}
