//! Stepdoc Variable
//!
//! Typed value sources for document steps. A [`Variable`] is a literal known
//! at definition time, a `%s` template over nested variables, or a reference
//! to a document parameter or an earlier step's output.
//!
//! Every variable can be printed (its serialized form, with references as
//! `{{Step.Output}}` placeholders), asked for the references it depends on,
//! and resolved against an [`OutputTable`] during simulation.

mod coerce;
mod error;
mod reference;
mod table;
mod variable;

pub use coerce::{coerce, infer_type};
pub use error::{CoercionError, VariableError};
pub use reference::ReferenceKey;
pub use stepdoc_config::DataType;
pub use table::OutputTable;
pub use variable::{Literal, Reference, Template, Variable};
