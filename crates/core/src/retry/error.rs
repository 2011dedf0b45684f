//! Retry error types.

use thiserror::Error;

/// Outcome of a retried operation that did not succeed.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every configured attempt failed.
    #[error("Operation failed after {attempts} of {max_attempts} attempts: {last_error}")]
    Exhausted {
        /// Error returned by the final attempt.
        last_error: E,
        /// Attempts made.
        attempts: u32,
        /// Configured attempt budget.
        max_attempts: u32,
    },

    /// The caller's classifier declared the error permanent.
    #[error("Operation failed permanently on attempt {attempt}: {error}")]
    Rejected {
        /// The permanent error.
        error: E,
        /// Attempt on which it occurred.
        attempt: u32,
    },

    /// The cancellation token fired at a suspension point.
    #[error("Operation cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Attempts completed before cancellation.
        attempts: u32,
    },
}

impl<E> RetryError<E> {
    /// Returns the underlying operation error, if one was recorded.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Exhausted { last_error, .. } => Some(last_error),
            Self::Rejected { error, .. } => Some(error),
            Self::Cancelled { .. } => None,
        }
    }

    /// Returns the number of attempts that were made.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts } => *attempts,
            Self::Rejected { attempt, .. } => *attempt,
        }
    }
}
