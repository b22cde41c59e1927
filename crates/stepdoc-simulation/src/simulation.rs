//! Simulation driver.
//!
//! [`Simulation`] runs a document's steps strictly in declaration order
//! against an [`Environment`], threading each step's extracted outputs into
//! an [`OutputTable`] that later steps resolve their references from.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use stepdoc_document::Document;
use stepdoc_environment::Environment;
use stepdoc_step::{Step, StepError};
use stepdoc_variable::{OutputTable, ReferenceKey, VariableError};
use tracing::{error, info, instrument, warn};

use crate::error::SimulationError;
use crate::events::{NoopNotifier, SimulationEvent, SimulationNotifier};
use crate::result::{RunStatus, SimulationResult, StepResult, StepState};

/// Runs a validated document against an environment.
pub struct Simulation {
  document: Document,
  notifier: Arc<dyn SimulationNotifier>,
}

impl Simulation {
  pub fn new(document: Document) -> Self {
    Self {
      document,
      notifier: Arc::new(NoopNotifier),
    }
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn SimulationNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn document(&self) -> &Document {
    &self.document
  }

  /// Run every step with the given parameter values.
  ///
  /// The run aborts at the first step whose references cannot be resolved
  /// or whose outputs cannot be extracted. A step that reports failure is
  /// recorded and the run continues; references to its outputs will then
  /// fail to resolve.
  #[instrument(
    name = "simulation_run",
    skip(self, env, inputs),
    fields(steps = self.document.steps().len())
  )]
  pub async fn run(
    &self,
    env: &mut dyn Environment,
    inputs: &serde_json::Map<String, Value>,
  ) -> Result<SimulationResult, SimulationError> {
    let execution_id = uuid::Uuid::new_v4().to_string();

    info!(execution_id = %execution_id, "simulation_started");
    self.notifier.notify(SimulationEvent::SimulationStarted {
      execution_id: execution_id.clone(),
      steps: self
        .document
        .steps()
        .iter()
        .map(|s| s.name().to_string())
        .collect(),
    });
    for step in self.document.steps() {
      self.transition(&execution_id, step, StepState::Pending);
    }

    let result = self.run_steps(env, inputs, &execution_id).await;

    match &result {
      Ok(run) => {
        info!(execution_id = %execution_id, status = ?run.status, "simulation_completed");
        self.notifier.notify(SimulationEvent::SimulationCompleted {
          execution_id: execution_id.clone(),
        });
      }
      Err(e) => {
        error!(execution_id = %execution_id, step = e.step(), error = %e, "simulation_aborted");
        self.notifier.notify(SimulationEvent::SimulationAborted {
          execution_id: execution_id.clone(),
          error: e.to_string(),
        });
      }
    }

    result
  }

  async fn run_steps(
    &self,
    env: &mut dyn Environment,
    inputs: &serde_json::Map<String, Value>,
    execution_id: &str,
  ) -> Result<SimulationResult, SimulationError> {
    let mut table = self.initial_table(inputs)?;
    let mut step_results = Vec::with_capacity(self.document.steps().len());

    for step in self.document.steps() {
      self.transition(execution_id, step, StepState::Resolving);
      let result = execute_step(step, env, &table).await?;

      self.notifier.notify(SimulationEvent::StepInvoked {
        execution_id: execution_id.to_string(),
        step: result.step.clone(),
        response_code: result.response_code,
      });

      for (output, value) in &result.outputs {
        table
          .insert(ReferenceKey::step_output(step.name(), output), value.clone())
          .map_err(|source| SimulationError::OutputTable {
            step: step.name().to_string(),
            source,
          })?;
      }

      self.transition(execution_id, step, StepState::Executed);
      step_results.push(result);
    }

    let status = if step_results
      .iter()
      .all(|r| r.response_code == stepdoc_environment::ResponseCode::Success)
    {
      RunStatus::Success
    } else {
      RunStatus::Failure
    };

    let mut outputs = BTreeMap::new();
    for key in self.document.outputs() {
      match table.get(key) {
        Some(value) => {
          outputs.insert(key.to_string(), value.clone());
        }
        None => warn!(output = %key, "document_output_unavailable"),
      }
    }

    Ok(SimulationResult {
      execution_id: execution_id.to_string(),
      status,
      step_results,
      outputs,
    })
  }

  /// Run one step in isolation against `table`.
  ///
  /// For debugging: earlier steps are not run and `table` is not modified,
  /// so it must already hold every value the step references.
  #[instrument(name = "simulation_run_step", skip(self, env, table), fields(step = %name))]
  pub async fn run_step(
    &self,
    name: &str,
    env: &mut dyn Environment,
    table: &OutputTable,
  ) -> Result<StepResult, SimulationError> {
    let step = self
      .document
      .step(name)
      .ok_or_else(|| SimulationError::StepNotFound {
        step: name.to_string(),
      })?;

    execute_step(step, env, table).await
  }

  /// Seed an output table from supplied parameter values.
  ///
  /// Each declared parameter takes its supplied value, coerced to its type,
  /// or else its default. Values for undeclared parameters are ignored.
  pub fn initial_table(
    &self,
    inputs: &serde_json::Map<String, Value>,
  ) -> Result<OutputTable, SimulationError> {
    let mut values = Vec::with_capacity(self.document.parameters().len());

    for (name, parameter) in self.document.parameters() {
      let value = match inputs.get(name) {
        Some(supplied) => {
          parameter
            .accept(supplied)
            .map_err(|reason| SimulationError::InvalidInput {
              parameter: name.clone(),
              reason,
            })?
        }
        None => parameter
          .default()
          .cloned()
          .ok_or_else(|| SimulationError::MissingInput {
            parameter: name.clone(),
          })?,
      };
      values.push((name.clone(), value));
    }

    for name in inputs.keys() {
      if !self.document.parameters().contains_key(name) {
        warn!(parameter = %name, "undeclared_input_ignored");
      }
    }

    Ok(OutputTable::from_parameters(values))
  }

  fn transition(&self, execution_id: &str, step: &Step, state: StepState) {
    self.notifier.notify(SimulationEvent::StepStateChanged {
      execution_id: execution_id.to_string(),
      step: step.name().to_string(),
      state,
    });
  }
}

/// Fail unless `table` holds every reference `step` depends on.
///
/// The error names the first missing key and the property that holds it.
fn verify_satisfiable(step: &Step, table: &OutputTable) -> Result<(), StepError> {
  let missing: Vec<ReferenceKey> = step
    .list_required_inputs()
    .into_iter()
    .filter(|key| !table.contains(key))
    .collect();
  let Some(first) = missing.first() else {
    return Ok(());
  };

  warn!(step = %step.name(), missing = ?missing, "step_inputs_unsatisfiable");
  let property = step
    .inputs()
    .iter()
    .find(|(_, value)| value.required_inputs().contains(first))
    .map(|(property, _)| property.clone())
    .unwrap_or_default();

  Err(StepError::Resolution {
    step: step.name().to_string(),
    property,
    source: VariableError::UnresolvedReference { key: first.clone() },
  })
}

/// Resolve, invoke and extract one step. The environment is not called when
/// any reference is unsatisfiable.
async fn execute_step(
  step: &Step,
  env: &mut dyn Environment,
  table: &OutputTable,
) -> Result<StepResult, SimulationError> {
  verify_satisfiable(step, table)?;
  let resolved_inputs = step.resolve_inputs(table)?;
  let invocation = step.invoke(&resolved_inputs, env).await;

  let outputs = if invocation.is_success() {
    step.extract_outputs(&invocation.raw_result)?
  } else {
    warn!(step = %step.name(), raw_result = %invocation.raw_result, "step_failed");
    BTreeMap::new()
  };

  info!(step = %step.name(), response_code = ?invocation.response_code, "step_executed");

  Ok(StepResult {
    step: step.name().to_string(),
    action: step.action().name().to_string(),
    resolved_inputs,
    response_code: invocation.response_code,
    raw_result: invocation.raw_result,
    outputs,
  })
}
