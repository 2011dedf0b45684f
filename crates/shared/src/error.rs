//! Configuration error types.

use thiserror::Error;

/// Result type alias using `ConfigError`.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required API credentials are absent.
    #[error("Accounting API credentials not configured: missing {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    /// A configured value is outside its allowed range.
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid {
        /// Configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl ConfigError {
    /// Returns the error code used in logs and operator output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCredentials(_) => "NOT_CONFIGURED",
            Self::Invalid { .. } => "INVALID_CONFIG",
            Self::Load(_) => "CONFIG_LOAD_FAILED",
        }
    }
}
