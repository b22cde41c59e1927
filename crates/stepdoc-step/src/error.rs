//! Step error types.

use thiserror::Error;

use stepdoc_variable::{CoercionError, VariableError};

/// A selector expression could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid selector '{selector}': {reason}")]
pub struct SelectorError {
  pub selector: String,
  pub reason: String,
}

/// Errors raised while applying an output descriptor to a raw result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractError {
  /// The selector path yields nothing.
  #[error("output '{output}': selector {selector} matched nothing")]
  SelectorNotFound { output: String, selector: String },

  /// The selected value cannot be coerced to the declared type.
  #[error("output '{output}': {source}")]
  TypeCoercion {
    output: String,
    #[source]
    source: CoercionError,
  },
}

/// Errors raised while building, resolving or reading a step.
#[derive(Debug, Error, PartialEq)]
pub enum StepError {
  /// Names must be non-empty ASCII alphanumerics, '_' or '-'.
  #[error("invalid step name '{name}'")]
  InvalidStepName { name: String },

  /// The action discriminator is not one of the supported actions.
  #[error("step '{step}': unknown action '{action}'")]
  UnknownAction { step: String, action: String },

  /// The action declares no such property.
  #[error("step '{step}': unknown property '{property}'")]
  UnknownProperty { step: String, property: String },

  /// The property was set twice.
  #[error("step '{step}': property '{property}' is set more than once")]
  DuplicateProperty { step: String, property: String },

  /// A required property was never set.
  #[error("step '{step}': missing required property '{property}'")]
  MissingRequiredProperty { step: String, property: String },

  /// The property's value has the wrong data type or shape.
  #[error("step '{step}': property '{property}' expects {expected}, got {found}")]
  TypeMismatch {
    step: String,
    property: String,
    expected: String,
    found: String,
  },

  /// A literal value is not allowed for the property.
  #[error("step '{step}': invalid value {value} for property '{property}': {reason}")]
  InvalidPropertyValue {
    step: String,
    property: String,
    value: String,
    reason: String,
  },

  /// Outputs were declared on an action whose outputs are fixed.
  #[error("step '{step}': action '{action}' does not accept custom outputs")]
  CustomOutputsUnsupported { step: String, action: String },

  /// Two outputs share a name.
  #[error("step '{step}': output '{output}' is declared more than once")]
  DuplicateOutput { step: String, output: String },

  /// An input could not be resolved against the output table.
  #[error("step '{step}': failed to resolve property '{property}': {source}")]
  Resolution {
    step: String,
    property: String,
    #[source]
    source: VariableError,
  },

  /// An output could not be extracted from the raw result.
  #[error("step '{step}': {source}")]
  Extraction {
    step: String,
    #[source]
    source: ExtractError,
  },
}
