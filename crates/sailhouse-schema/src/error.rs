//! Error types for schema loading, remote gateway calls and reconciliation runs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file does not exist.
    #[error("Schema file {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The schema file exists but could not be read.
    #[error("Failed to read schema file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a well-formed schema.
    #[error("Schema is malformed: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but breaks a schema rule.
    #[error("Schema is invalid: {message}")]
    Validation { message: String },
}

impl SchemaError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Errors reported by a [`RemoteGateway`](crate::RemoteGateway).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The app, topic or subscription does not exist remotely.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The object being created already exists remotely.
    #[error("Conflict: {0} already exists")]
    Conflict(String),

    /// Any network or API failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Conflict(_) => ErrorCategory::Conflict,
            Self::Transport(_) => ErrorCategory::Transport,
        }
    }
}

/// Errors that stop a reconciliation run before any change is applied.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to fetch remote state: {0}")]
    Gateway(#[from] GatewayError),
}

impl ReconcileError {
    /// A missing schema file only aborts the run; everything else is a failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Schema(SchemaError::NotFound(_)))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Schema(SchemaError::NotFound(_)) => ErrorCategory::NotFound,
            Self::Schema(SchemaError::Io { .. }) => ErrorCategory::Io,
            Self::Schema(SchemaError::Parse(_)) => ErrorCategory::Parse,
            Self::Schema(SchemaError::Validation { .. }) => ErrorCategory::Validation,
            Self::Gateway(err) => err.category(),
        }
    }
}

/// Error categories for logging and exit reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Parse,
    Validation,
    NotFound,
    Conflict,
    Transport,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::Parse => write!(f, "parse"),
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Transport => write!(f, "transport"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::conflict("topic orders");
        assert_eq!(err.to_string(), "Conflict: topic orders already exists");
        assert_eq!(err.category(), ErrorCategory::Conflict);

        let err = GatewayError::transport("HTTP 500 Internal Server Error");
        assert_eq!(
            err.to_string(),
            "Transport error: HTTP 500 Internal Server Error"
        );
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_missing_schema_is_not_fatal() {
        let err: ReconcileError = SchemaError::NotFound(PathBuf::from("sailhouse.yaml")).into();
        assert!(!err.is_fatal());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_string(), "Schema file sailhouse.yaml does not exist");
    }

    #[test]
    fn test_validation_and_gateway_errors_are_fatal() {
        let err: ReconcileError = SchemaError::validation("key too long").into();
        assert!(err.is_fatal());
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: ReconcileError = GatewayError::not_found("app demo").into();
        assert!(err.is_fatal());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(
            err.to_string(),
            "Failed to fetch remote state: Not found: app demo"
        );
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::Io.to_string(), "io");
        assert_eq!(ErrorCategory::Parse.to_string(), "parse");
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCategory::Conflict.to_string(), "conflict");
        assert_eq!(ErrorCategory::Transport.to_string(), "transport");
    }
}
