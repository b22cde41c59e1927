//! Variable error types.

use thiserror::Error;

use stepdoc_config::DataType;

use crate::reference::ReferenceKey;

/// Errors raised while constructing or resolving variables.
#[derive(Debug, Error, PartialEq)]
pub enum VariableError {
  /// A reference's target is not in the output table.
  #[error("unresolved reference {{{{{key}}}}}: the target has not executed or declares no such output")]
  UnresolvedReference { key: ReferenceKey },

  /// The literal has no data type (null, float, mixed list, ...).
  #[error("unsupported literal value: {value}")]
  UnsupportedLiteral { value: String },

  /// Placeholder count does not match the number of arguments.
  #[error("template '{format}' has {placeholders} placeholder(s) but {args} argument(s)")]
  TemplateArity {
    format: String,
    placeholders: usize,
    args: usize,
  },

  /// An output table key was written twice.
  #[error("output table already holds a value for '{key}'")]
  AlreadyWritten { key: ReferenceKey },

  /// Malformed reference string.
  #[error("invalid reference '{reference}'")]
  InvalidReference { reference: String },
}

/// A value could not be coerced to the requested data type.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot coerce {value} to {expected}")]
pub struct CoercionError {
  pub expected: DataType,
  pub value: serde_json::Value,
}
