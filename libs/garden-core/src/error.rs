//! Error types for the garden engine

use thiserror::Error;

/// Result type alias for garden operations
pub type Result<T> = std::result::Result<T, GardenError>;

/// Main error type for garden operations
#[derive(Error, Debug)]
pub enum GardenError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source '{source_name}' failed: {message}")]
    SourceFailure {
        source_name: String,
        message: String,
    },

    #[error("Malformed {kind} record at index {index}: {reason}")]
    MalformedRecord {
        kind: String,
        index: usize,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl GardenError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a source failure error
    pub fn source_failure(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceFailure {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed(kind: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            kind: kind.into(),
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_serialization_error_from_serde() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: GardenError = json_error.into();
        assert!(matches!(error, GardenError::Serialization(_)));
    }

    #[test]
    fn test_io_error_from_std() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: GardenError = io_error.into();
        assert!(matches!(error, GardenError::Io(_)));
    }

    #[test]
    fn test_source_failure_helper() {
        let error = GardenError::source_failure("tasks", "connection reset");
        assert!(error.to_string().contains("tasks"));
        assert!(error.to_string().contains("connection reset"));
    }

    #[test]
    fn test_malformed_helper() {
        let error = GardenError::malformed("planting", 3, "missing planting date");
        match &error {
            GardenError::MalformedRecord { kind, index, reason } => {
                assert_eq!(kind, "planting");
                assert_eq!(*index, 3);
                assert_eq!(reason, "missing planting date");
            }
            _ => panic!("Expected MalformedRecord error"),
        }
        assert_eq!(
            error.to_string(),
            "Malformed planting record at index 3: missing planting date"
        );
    }

    #[test]
    fn test_configuration_helper() {
        let error = GardenError::configuration("Invalid log level");
        match error {
            GardenError::Configuration { message } => assert_eq!(message, "Invalid log level"),
            _ => panic!("Expected Configuration error"),
        }
    }
}
