//! Bounded retries with exponential backoff and jitter.
//!
//! The executor knows nothing about accounting data or HTTP status codes. It
//! re-runs an async operation until it succeeds or the policy's attempt budget
//! is spent. Callers that want to stop early on permanent failures pass their
//! own classifier to [`RetryExecutor::execute_while`].

pub mod error;
pub mod executor;
pub mod policy;

#[cfg(test)]
mod policy_props;

pub use error::RetryError;
pub use executor::RetryExecutor;
pub use policy::RetryPolicy;
