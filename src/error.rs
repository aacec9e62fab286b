//! Error types for netclass

use thiserror::Error;

/// Result type alias for netclass operations
pub type Result<T> = std::result::Result<T, NetclassError>;

/// Main error type for the classifiers and their data pipeline
#[derive(Error, Debug)]
pub enum NetclassError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    NotFitted,

    /// The tree was fit with `max_depth == 0` and has no root to predict from.
    #[error("Decision tree is empty (fit with max_depth = 0)")]
    EmptyTree,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl NetclassError {
    pub(crate) fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        NetclassError::ShapeError {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        NetclassError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for NetclassError {
    fn from(err: polars::error::PolarsError) -> Self {
        NetclassError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for NetclassError {
    fn from(err: serde_json::Error) -> Self {
        NetclassError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetclassError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NetclassError = io_err.into();
        assert!(matches!(err, NetclassError::IoError(_)));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = NetclassError::invalid_parameter("batch_size", 64, "exceeds the 10 available samples");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: batch_size = 64, exceeds the 10 available samples"
        );
    }
}
