//! Fetch error taxonomy.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use ledgerlink_core::retry::RetryError;
use ledgerlink_core::schema::SchemaError;
use ledgerlink_core::validation::ValidationError;
use ledgerlink_shared::ConfigError;
use thiserror::Error;

/// Result type alias using `FetchError`.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors surfaced by trial balance and journal fetches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Required credentials are absent. Never retried.
    #[error("Accounting API not configured: {0}")]
    NotConfigured(String),

    /// The endpoint answered without a body.
    #[error("Empty response from {endpoint}")]
    EmptyResponse {
        /// Logical endpoint name.
        endpoint: &'static str,
    },

    /// The endpoint answered with a non-success status.
    #[error("Accounting API returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
        /// Seconds from the `Retry-After` header, if sent.
        retry_after_secs: Option<u64>,
    },

    /// The request never produced a response.
    #[error("Transport error ({kind}): {message}")]
    Transport {
        /// Failure category.
        kind: TransportKind,
        /// Underlying error text.
        message: String,
    },

    /// The response failed structural validation. Never retried.
    #[error("Schema mismatch at '{path}': {message}")]
    SchemaMismatch {
        /// Path of the violating field.
        path: String,
        /// Description of the violation.
        message: String,
    },

    /// Every attempt of a single network call failed.
    #[error("Gave up after {attempts} of {max_attempts} attempts: {last_error}")]
    RetryExhausted {
        /// Attempts made.
        attempts: u32,
        /// Configured attempt budget.
        max_attempts: u32,
        /// Error from the final attempt.
        last_error: Box<FetchError>,
    },

    /// The caller cancelled the fetch.
    #[error("Fetch cancelled")]
    Cancelled,

    /// Request or result consistency violation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Categories of transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The request timed out.
    Timeout,
    /// The peer reset the connection.
    ConnectionReset,
    /// The connection could not be established.
    Connect,
    /// Anything else, including body decoding failures.
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::ConnectionReset => "connection reset",
            Self::Connect => "connect",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

impl FetchError {
    /// Whether retrying the call could plausibly succeed.
    ///
    /// HTTP 429, HTTP 5xx, timeouts and connection resets are transient.
    /// Everything else is permanent. The retry executor does not consult this
    /// unless the fetcher runs in transient-only mode.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Transport { kind, .. } => {
                matches!(kind, TransportKind::Timeout | TransportKind::ConnectionReset)
            }
            _ => false,
        }
    }

    /// Returns the error code used in logs and operator output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "NOT_CONFIGURED",
            Self::EmptyResponse { .. } => "EMPTY_RESPONSE",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::RetryExhausted { .. } => "RETRY_EXHAUSTED",
            Self::Cancelled => "CANCELLED",
            Self::Validation(e) => e.error_code(),
        }
    }

    /// Returns what an operator should do about this error.
    #[must_use]
    pub const fn user_hint(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => {
                "Reconfigure the accounting connection: set the client ID, client secret, \
                 redirect URI and access token, then run again."
            }
            Self::RetryExhausted { .. } | Self::EmptyResponse { .. } | Self::Transport { .. } => {
                "The accounting platform is not responding. Try again later."
            }
            Self::Http { status, .. } => match *status {
                401 | 403 => "The access token was rejected. Reconnect the organisation.",
                429 => "Rate limited by the accounting platform. Try again later.",
                _ => "The accounting platform rejected the request.",
            },
            Self::SchemaMismatch { .. } => {
                "The accounting platform returned data in an unexpected shape."
            }
            Self::Cancelled => "The fetch was cancelled.",
            Self::Validation(_) => "The fetched data failed consistency checks.",
        }
    }
}

impl From<SchemaError> for FetchError {
    fn from(err: SchemaError) -> Self {
        Self::SchemaMismatch {
            path: err.path().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ConfigError> for FetchError {
    fn from(err: ConfigError) -> Self {
        Self::NotConfigured(err.to_string())
    }
}

impl From<RetryError<FetchError>> for FetchError {
    fn from(err: RetryError<FetchError>) -> Self {
        match err {
            RetryError::Exhausted {
                last_error,
                attempts,
                max_attempts,
            } => Self::RetryExhausted {
                attempts,
                max_attempts,
                last_error: Box::new(last_error),
            },
            RetryError::Rejected { error, .. } => error,
            RetryError::Cancelled { .. } => Self::Cancelled,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if is_connection_reset(&err) {
            TransportKind::ConnectionReset
        } else if err.is_connect() {
            TransportKind::Connect
        } else {
            TransportKind::Other
        };
        Self::Transport {
            kind,
            message: err.to_string(),
        }
    }
}

fn is_connection_reset(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(current) = source {
        if let Some(io_err) = current.downcast_ref::<io::Error>()
            && matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
            )
        {
            return true;
        }
        source = current.source();
    }
    false
}
