//! Simulation result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stepdoc_environment::ResponseCode;

/// Where a step is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepState {
  /// Not reached yet.
  Pending,
  /// Substituting references from the output table.
  Resolving,
  /// Invoked; outputs recorded when the invocation succeeded. Terminal.
  Executed,
}

/// Overall outcome of a run that reached every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
  /// Every step reported success.
  Success,
  /// At least one step reported failure.
  Failure,
}

/// Result of a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
  pub step: String,
  pub action: String,
  /// Inputs after reference resolution, keyed by property name.
  pub resolved_inputs: BTreeMap<String, serde_json::Value>,
  pub response_code: ResponseCode,
  pub raw_result: serde_json::Value,
  /// Extracted outputs. Empty when the invocation failed.
  pub outputs: BTreeMap<String, serde_json::Value>,
}

/// Result of a complete run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
  /// Unique execution ID.
  pub execution_id: String,
  pub status: RunStatus,
  /// One entry per step, in execution order.
  pub step_results: Vec<StepResult>,
  /// Document-level outputs keyed by `Step.Output`.
  pub outputs: BTreeMap<String, serde_json::Value>,
}

impl SimulationResult {
  pub fn step(&self, name: &str) -> Option<&StepResult> {
    self.step_results.iter().find(|r| r.step == name)
  }
}
