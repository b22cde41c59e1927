use thiserror::Error;

use stepdoc_step::{SelectorError, StepError};
use stepdoc_variable::{DataType, VariableError};

/// Errors raised while building, loading or printing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
  /// A document needs at least one step.
  #[error("document has no steps")]
  EmptyDocument,

  /// Two steps share a name.
  #[error("duplicate step name: {step}")]
  DuplicateStepName { step: String },

  /// Two parameters share a name.
  #[error("duplicate parameter: {parameter}")]
  DuplicateParameter { parameter: String },

  /// A parameter's name, default or allowed values are inconsistent.
  #[error("invalid parameter '{parameter}': {reason}")]
  InvalidParameter { parameter: String, reason: String },

  /// A reference names a step that does not exist.
  #[error("step '{step}' references unknown step in {reference}")]
  UnknownStep { step: String, reference: String },

  /// A reference names the step itself or a later one.
  #[error("step '{step}' references '{target}', which does not run before it")]
  ForwardReference { step: String, target: String },

  /// A reference names an output its target step does not declare.
  #[error("step '{step}' references output '{output}' which step '{target}' does not declare")]
  UnknownOutput {
    step: String,
    target: String,
    output: String,
  },

  /// A reference names a parameter the document does not declare.
  #[error("step '{step}' references undeclared parameter '{parameter}'")]
  UndeclaredParameter { step: String, parameter: String },

  /// A reference expects a different type than its target provides.
  #[error("step '{step}': {reference} is {expected} but is used as {found}")]
  ReferenceTypeMismatch {
    step: String,
    reference: String,
    expected: DataType,
    found: DataType,
  },

  /// A document output is not a declared `Step.Output`.
  #[error("invalid document output '{output}': {reason}")]
  InvalidDocumentOutput { output: String, reason: String },

  /// A step definition failed validation.
  #[error(transparent)]
  Step(#[from] StepError),

  /// An output selector in a definition is malformed.
  #[error("step '{step}': {source}")]
  Selector {
    step: String,
    #[source]
    source: SelectorError,
  },

  /// A variable in a definition is malformed.
  #[error("step '{step}', property '{property}': {source}")]
  Variable {
    step: String,
    property: String,
    #[source]
    source: VariableError,
  },

  /// The document could not be rendered as JSON.
  #[error("failed to serialize document: {0}")]
  Serialization(#[from] serde_json::Error),
}
