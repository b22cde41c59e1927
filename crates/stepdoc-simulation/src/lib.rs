//! Stepdoc Simulation
//!
//! Executes a [`Document`](stepdoc_document::Document) locally, step by step,
//! against a pluggable [`Environment`](stepdoc_environment::Environment).
//! Each step moves Pending → Resolving → Executed in declaration order.

mod error;
mod events;
mod result;
mod simulation;

pub use error::SimulationError;
pub use events::{ChannelNotifier, NoopNotifier, SimulationEvent, SimulationNotifier};
pub use result::{RunStatus, SimulationResult, StepResult, StepState};
pub use simulation::Simulation;
