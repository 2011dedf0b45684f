//! Schema error types.

use thiserror::Error;

/// Result type alias using `SchemaError`.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Structural violations found while validating a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A required field is absent or null.
    #[error("Missing required field at {path}")]
    MissingField {
        /// Path of the missing field.
        path: String,
    },

    /// A field has the wrong JSON type.
    #[error("Expected {expected} at {path}, found {found}")]
    WrongType {
        /// Path of the offending field.
        path: String,
        /// Expected JSON type.
        expected: &'static str,
        /// Actual JSON type.
        found: &'static str,
    },

    /// A field has the right type but an unusable value.
    #[error("Invalid value at {path}: {reason}")]
    InvalidValue {
        /// Path of the offending field.
        path: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The document is not JSON at all.
    #[error("Malformed JSON document: {0}")]
    MalformedJson(String),
}

impl SchemaError {
    /// Returns the path of the violating field.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path }
            | Self::WrongType { path, .. }
            | Self::InvalidValue { path, .. } => path,
            Self::MalformedJson(_) => "",
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedJson(err.to_string())
    }
}
