//! Bridge transport errors.

use std::time::Duration;

/// Failures of the bridge itself, as opposed to a `FAILURE` response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
  /// The interpreter process could not be started.
  #[error("failed to spawn interpreter '{interpreter}': {source}")]
  Spawn {
    interpreter: String,
    #[source]
    source: std::io::Error,
  },

  /// Waiting on the started interpreter failed.
  #[error("failed waiting for interpreter '{interpreter}': {source}")]
  Wait {
    interpreter: String,
    #[source]
    source: std::io::Error,
  },

  /// The call did not finish in time.
  #[error("bridge call timed out after {0:?}")]
  Timeout(Duration),

  /// The interpreter exited unsuccessfully.
  #[error("interpreter exited unsuccessfully (exit code {exit_code:?}): {stderr}")]
  ProcessFailed {
    exit_code: Option<i32>,
    stderr: String,
  },

  /// The interpreter wrote nothing to stdout.
  #[error("interpreter produced no output")]
  EmptyOutput,

  /// The last output line is not a valid response.
  #[error("invalid bridge response '{line}': {source}")]
  InvalidResponse {
    line: String,
    #[source]
    source: serde_json::Error,
  },

  /// The argument payload could not be encoded.
  #[error("failed to encode bridge argument: {source}")]
  ArgumentEncoding {
    #[source]
    source: serde_json::Error,
  },
}
