//! Environment error types.

use std::time::Duration;

use stepdoc_bridge::TransportError;

/// Errors reported by an environment call.
///
/// Steps turn these into a `Failure` response code; they never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
  /// The environment does not implement this operation.
  #[error("operation '{operation}' is not supported by this environment")]
  Unsupported { operation: &'static str },

  /// The operation exceeded its time limit.
  #[error("operation '{operation}' timed out after {timeout:?}")]
  Timeout {
    operation: &'static str,
    timeout: Duration,
  },

  /// Local I/O failed.
  #[error("operation '{operation}' failed: {source}")]
  Io {
    operation: &'static str,
    #[source]
    source: std::io::Error,
  },

  /// The environment refused the request.
  #[error("operation '{operation}' rejected: {message}")]
  Rejected {
    operation: &'static str,
    message: String,
  },

  /// The script bridge failed to deliver a response.
  #[error("script bridge transport failed: {0}")]
  Transport(#[from] TransportError),
}
