use std::error::Error;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use strata::errors::{ErrorKind, StrataError};
use strata::migration::{Direction, LogEntry, Migration, Version};
use thiserror::Error;

/// Errors raised while reading or writing log records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FjallLogError {
    #[error("Serialization failed: {0}")]
    SerializationError(String),
    #[error("Deserialization failed: {0}")]
    DeserializationError(String),
    /// A key that is not an 8-byte sequence number
    #[error("Invalid sequence key of {0} bytes")]
    InvalidSequenceKey(usize),
    #[error("Invalid timestamp {0}s {1}ns in log record")]
    InvalidTimestamp(i64, u32),
}

pub type FjallLogResult<T> = Result<T, FjallLogError>;

impl From<FjallLogError> for StrataError {
    fn from(err: FjallLogError) -> Self {
        let kind = match err {
            FjallLogError::SerializationError(_) | FjallLogError::DeserializationError(_) => {
                ErrorKind::EncodingError
            }
            FjallLogError::InvalidSequenceKey(_) | FjallLogError::InvalidTimestamp(..) => {
                ErrorKind::InvalidLogEntry
            }
        };
        StrataError::new(&err.to_string(), kind)
    }
}

/// Maps a fjall error onto a strata error kind.
pub(crate) fn to_strata_error(error: impl Error) -> StrataError {
    let error_msg = error.to_string();
    let error_kind = if error_msg.contains("permission") || error_msg.contains("Permission") {
        ErrorKind::PermissionDenied
    } else {
        ErrorKind::BackendError
    };
    log::error!("Fjall error: {}", error_msg);
    StrataError::new(&format!("Fjall Error: {}", error_msg), error_kind)
}

/// On-disk form of one log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LogRecord {
    version: Version,
    name: String,
    direction: char,
    applied_at_secs: i64,
    applied_at_nanos: u32,
}

impl LogRecord {
    pub(crate) fn from_entry(entry: &LogEntry) -> Self {
        LogRecord {
            version: entry.migration.version,
            name: entry.migration.name.clone(),
            direction: entry.direction.code(),
            applied_at_secs: entry.applied_at.timestamp(),
            applied_at_nanos: entry.applied_at.timestamp_subsec_nanos(),
        }
    }

    pub(crate) fn into_entry(self) -> Result<LogEntry, StrataError> {
        let direction = Direction::from_code(self.direction)?;
        let applied_at = DateTime::from_timestamp(self.applied_at_secs, self.applied_at_nanos)
            .ok_or(FjallLogError::InvalidTimestamp(
                self.applied_at_secs,
                self.applied_at_nanos,
            ))?;
        Ok(LogEntry::new(
            Migration::new(self.version, &self.name),
            direction,
            applied_at,
        ))
    }

    pub(crate) fn encode(&self) -> FjallLogResult<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::legacy())
            .map_err(|e| FjallLogError::SerializationError(e.to_string()))
    }

    pub(crate) fn decode(bytes: &[u8]) -> FjallLogResult<LogRecord> {
        bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
            .map(|(record, _)| record)
            .map_err(|e| FjallLogError::DeserializationError(e.to_string()))
    }
}

pub(crate) fn encode_sequence(sequence: u64) -> Vec<u8> {
    sequence.to_be_bytes().to_vec()
}

pub(crate) fn decode_sequence(key: &[u8]) -> FjallLogResult<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| FjallLogError::InvalidSequenceKey(key.len()))?;
    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(direction: Direction) -> LogEntry {
        LogEntry::new(
            Migration::new(20211224091800, "add_users_table"),
            direction,
            Utc.timestamp_millis_opt(1_640_337_480_123).unwrap(),
        )
    }

    #[test]
    fn test_record_keeps_nanosecond_precision() {
        let precise = LogEntry::new(
            Migration::new(20211224091800, "add_users_table"),
            Direction::Up,
            Utc.timestamp_opt(1_640_337_480, 123_456_789).unwrap(),
        );
        let bytes = LogRecord::from_entry(&precise).encode().unwrap();
        let decoded = LogRecord::decode(&bytes).unwrap().into_entry().unwrap();
        assert_eq!(decoded, precise);
        assert_eq!(decoded.applied_at.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_record_decodes_to_same_entry() {
        let record = LogRecord::from_entry(&entry(Direction::Down));
        let bytes = record.encode().unwrap();
        let decoded = LogRecord::decode(&bytes).unwrap().into_entry().unwrap();
        assert_eq!(decoded, entry(Direction::Down));
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let record = LogRecord {
            version: 1,
            name: "a".to_string(),
            direction: 'x',
            applied_at_secs: 0,
            applied_at_nanos: 0,
        };
        let err = record.into_entry().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidLogEntry);
    }

    #[test]
    fn test_out_of_range_timestamp_is_rejected() {
        let record = LogRecord {
            version: 1,
            name: "a".to_string(),
            direction: 'u',
            applied_at_secs: i64::MAX,
            applied_at_nanos: 0,
        };
        let err = record.into_entry().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidLogEntry);
    }

    #[test]
    fn test_nanos_past_one_second_are_rejected() {
        let record = LogRecord {
            version: 1,
            name: "a".to_string(),
            direction: 'u',
            applied_at_secs: 0,
            applied_at_nanos: 2_000_000_000,
        };
        let err = record.into_entry().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidLogEntry);
    }

    #[test]
    fn test_fjall_failures_map_to_backend_kinds() {
        let denied = std::io::Error::new(std::io::ErrorKind::Other, "permission denied");
        assert_eq!(to_strata_error(denied).kind(), &ErrorKind::PermissionDenied);

        let other = std::io::Error::new(std::io::ErrorKind::Other, "journal recovery failed");
        let err = to_strata_error(other);
        assert_eq!(err.kind(), &ErrorKind::BackendError);
        assert!(err.message().starts_with("Fjall Error:"));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err: StrataError = LogRecord::decode(&[0xff, 0x01]).unwrap_err().into();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn test_sequence_keys_sort_numerically() {
        assert!(encode_sequence(2) < encode_sequence(256));
        assert_eq!(decode_sequence(&encode_sequence(42)).unwrap(), 42);
        assert_eq!(
            decode_sequence(&[1, 2, 3]),
            Err(FjallLogError::InvalidSequenceKey(3))
        );
    }
}
