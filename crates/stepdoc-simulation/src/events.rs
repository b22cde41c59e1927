//! Simulation events and notifiers.
//!
//! Events are emitted during a run so callers can observe progress without
//! waiting for the final [`SimulationResult`](crate::SimulationResult).

use serde::{Deserialize, Serialize};
use stepdoc_environment::ResponseCode;
use tokio::sync::mpsc;

use crate::result::StepState;

/// Events emitted during a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
  /// The run has started. A `Pending` transition follows for each step.
  SimulationStarted {
    execution_id: String,
    steps: Vec<String>,
  },

  /// A step moved to a new state.
  StepStateChanged {
    execution_id: String,
    step: String,
    state: StepState,
  },

  /// A step's invocation returned.
  StepInvoked {
    execution_id: String,
    step: String,
    response_code: ResponseCode,
  },

  /// Every step was executed.
  SimulationCompleted { execution_id: String },

  /// The run stopped early.
  SimulationAborted { execution_id: String, error: String },
}

/// Receives simulation events.
pub trait SimulationNotifier: Send + Sync {
  fn notify(&self, event: SimulationEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl SimulationNotifier for NoopNotifier {
  fn notify(&self, _event: SimulationEvent) {}
}

/// Sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<SimulationEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<SimulationEvent>) -> Self {
    Self { sender }
  }
}

impl SimulationNotifier for ChannelNotifier {
  fn notify(&self, event: SimulationEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
