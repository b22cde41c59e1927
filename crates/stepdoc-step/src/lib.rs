//! Stepdoc Step
//!
//! A step binds typed variables to the properties of one action and declares
//! the outputs it exposes. The same step can be serialized into a document
//! entry or resolved and invoked against an
//! [`Environment`](stepdoc_environment::Environment) during simulation.

mod action;
mod error;
mod invoke;
mod output;
mod property;
mod selector;
mod step;

pub use action::{StepAction, parse_duration};
pub use error::{ExtractError, SelectorError, StepError};
pub use output::{OutputDescriptor, OutputEntry};
pub use property::{PropertyShape, PropertySpec, PropertyValue, ValueFormat};
pub use selector::Selector;
pub use step::{Step, StepBuilder, StepEntry, is_valid_name};
