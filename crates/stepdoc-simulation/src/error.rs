//! Simulation error types.

use stepdoc_step::StepError;
use stepdoc_variable::VariableError;

/// Errors that abort a simulation run.
///
/// A step whose invocation reports failure does not abort the run; that is
/// recorded in its [`StepResult`](crate::StepResult) instead.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
  /// A parameter without a default was not supplied.
  #[error("missing input for parameter '{parameter}'")]
  MissingInput { parameter: String },

  /// A supplied parameter value does not fit the parameter.
  #[error("invalid input for parameter '{parameter}': {reason}")]
  InvalidInput { parameter: String, reason: String },

  /// Resolution or output extraction failed for a step.
  #[error(transparent)]
  Step(#[from] StepError),

  /// No step with this name exists in the document.
  #[error("step not found: {step}")]
  StepNotFound { step: String },

  /// An output could not be recorded.
  #[error("step '{step}': {source}")]
  OutputTable {
    step: String,
    #[source]
    source: VariableError,
  },
}

impl SimulationError {
  /// Name of the step the error is attributed to, if any.
  pub fn step(&self) -> Option<&str> {
    match self {
      SimulationError::Step(StepError::Resolution { step, .. })
      | SimulationError::Step(StepError::Extraction { step, .. })
      | SimulationError::StepNotFound { step }
      | SimulationError::OutputTable { step, .. } => Some(step.as_str()),
      _ => None,
    }
  }
}
