//! Error types for drift-guard.
//!
//! All fallible operations return [`DriftError`] through the crate-wide
//! [`Result`] alias. Data drift itself is never an error: out-of-range values
//! and unseen categories are reported as [`Finding`](crate::finding::Finding)s.

use thiserror::Error;

/// The main error type for drift-guard.
#[derive(Error, Debug)]
pub enum DriftError {
    /// `validate` was called before any successful `fit`.
    #[error("Monitor has not been fitted: call fit before validate")]
    NotFitted,

    /// `fit` was called with degenerate input. The previous schema is kept.
    #[error("Schema error: {message}")]
    Schema {
        /// Human-readable error message
        message: String,
    },

    /// A table is not a well-formed feature table (ragged or duplicate columns).
    #[error("Shape error: {message}")]
    Shape {
        /// Human-readable error message
        message: String,
    },

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Parquet", "JSON")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A type alias for `Result<T, DriftError>`.
pub type Result<T> = std::result::Result<T, DriftError>;

impl DriftError {
    /// Creates a new schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates a new shape error.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns `true` for errors caused by the caller's data rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NotFitted | Self::Schema { .. } | Self::Shape { .. }
        )
    }
}

impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_not_fitted_message() {
        let err = DriftError::NotFitted;
        assert!(err.to_string().contains("not been fitted"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_schema_error() {
        let err = DriftError::schema("reference table has zero rows");
        assert_eq!(
            err.to_string(),
            "Schema error: reference table has zero rows"
        );
    }

    #[test]
    fn test_shape_error() {
        let err = DriftError::shape("column 'b' has 2 rows, expected 3");
        assert_eq!(
            err.to_string(),
            "Shape error: column 'b' has 2 rows, expected 3"
        );
    }

    #[test]
    fn test_data_source_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = DriftError::data_source_with_source("CSV", "Could not read", Box::new(source));

        assert!(err.source().is_some());
        assert!(!err.is_input_error());
        assert_eq!(err.to_string(), "Data source error: Could not read");
    }

    #[test]
    fn test_serde_json_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: DriftError = parse.unwrap_err().into();
        assert!(matches!(err, DriftError::Serialization(_)));
    }
}
