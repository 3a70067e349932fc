//! Error types for Mason

use thiserror::Error;

/// The main error type for Mason operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A table, column or alias argument that is not a usable identifier
    #[error("Invalid {what}: '{value}'")]
    InvalidIdentifier { what: &'static str, value: String },

    /// A subquery closure produced a statement that renders to no SQL
    #[error("Unexpected result: {message}")]
    UnexpectedResult { message: String },

    /// A named placeholder in the statement has no bound value
    #[error("Unknown parameter ':{name}'")]
    UnknownParameter { name: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result type for Mason operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid identifier error
    pub fn invalid_identifier(what: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            what,
            value: value.into(),
        }
    }

    /// Create a new unexpected result error
    pub fn unexpected_result(message: impl Into<String>) -> Self {
        Self::UnexpectedResult {
            message: message.into(),
        }
    }

    /// Create a new unknown parameter error
    pub fn unknown_parameter(name: impl Into<String>) -> Self {
        Self::UnknownParameter { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_identifier_error() {
        let err = Error::invalid_identifier("table name", "");
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
        assert_eq!(err.to_string(), "Invalid table name: ''");
    }

    #[test]
    fn test_unexpected_result_error() {
        let err = Error::unexpected_result("subquery rendered no SQL");
        assert!(matches!(err, Error::UnexpectedResult { .. }));
        assert_eq!(
            err.to_string(),
            "Unexpected result: subquery rendered no SQL"
        );
    }

    #[test]
    fn test_unknown_parameter_error() {
        let err = Error::unknown_parameter("age");
        assert!(matches!(err, Error::UnknownParameter { .. }));
        assert_eq!(err.to_string(), "Unknown parameter ':age'");
    }
}
