//! Error types for vayuwatch.
//!
//! Dataset, storage and configuration failures share one enum. Account
//! operations never return it; they report plain success flags and log the
//! underlying error.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for vayuwatch operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// The account database could not be opened.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A statement against the account database failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The schema could not be brought to the current version.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Figment could not assemble the configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Dataset Errors ===
    /// Failed to read or parse a dataset file.
    #[error("failed to load dataset from {path}: {message}")]
    DatasetLoad {
        /// Path to the dataset file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// A dataset parsed but violates a data invariant.
    #[error("invalid dataset: {message}")]
    DatasetInvalid {
        /// Description of the violated invariant.
        message: String,
    },

    /// A state, city or ward id did not resolve.
    #[error("unknown {kind}: {id}")]
    UnknownEntity {
        /// Kind of entity that was looked up.
        kind: &'static str,
        /// The id that was requested.
        id: String,
    },

    /// The dataset contains no cities to aggregate.
    #[error("dataset contains no cities")]
    EmptyDataset,

    // === I/O Errors ===
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parent directory for the database could not be created.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// A JSON blob or dataset failed to (de)serialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for vayuwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an unknown entity error.
    #[must_use]
    pub fn unknown_entity(kind: &'static str, id: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyDataset;
        assert_eq!(err.to_string(), "dataset contains no cities");
    }

    #[test]
    fn test_unknown_entity() {
        let err = Error::unknown_entity("city", "atlantis");
        assert_eq!(err.to_string(), "unknown city: atlantis");
        assert!(matches!(err, Error::UnknownEntity { kind: "city", .. }));
    }

    #[test]
    fn test_dataset_load_display() {
        let err = Error::DatasetLoad {
            path: PathBuf::from("/data/india.json"),
            message: "missing field `aqi`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/india.json"));
        assert!(msg.contains("missing field"));
    }

    #[test]
    fn test_io_and_json_conversions() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "india.json").into();
        assert!(matches!(err, Error::Io(_)));

        let parse = serde_json::from_str::<Vec<u32>>("[1, 2").unwrap_err();
        let err: Error = parse.into();
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_sqlite_conversion() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let sqlite_err = conn.execute("SELECT * FROM missing_table", []).unwrap_err();
        let err: Error = sqlite_err.into();
        assert!(matches!(err, Error::DatabaseQuery(_)));
        assert!(err.to_string().contains("missing_table"));
    }

    #[test]
    fn test_dataset_invalid_and_migration_display() {
        let err = Error::DatasetInvalid {
            message: "duplicate city id: pune".to_string(),
        };
        assert_eq!(err.to_string(), "invalid dataset: duplicate city id: pune");

        let err = Error::DatabaseMigration {
            message: "schema version 3 is newer".to_string(),
        };
        assert!(err.to_string().starts_with("database migration failed"));
    }

    #[test]
    fn test_directory_create_keeps_source() {
        use std::error::Error as _;

        let err = Error::DirectoryCreate {
            path: PathBuf::from("/var/lib/vayuwatch"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/var/lib/vayuwatch"));
        assert!(err.source().is_some());
    }
}
