//! Stepdoc Config
//!
//! This crate contains the serializable document definition types for stepdoc.
//! These types represent a document as an author writes it, before it is
//! loaded and validated into a `Document`.
//!
//! Definitions can be loaded from JSON files (via the CLI) or built in code.
//! The loader takes these types, infers reference types, and hands the result
//! to the document builder for validation.

mod document;
mod enums;
mod step;
mod variable;

pub use document::{DocumentDef, ParameterDef};
pub use enums::{DataType, DocumentType};
pub use step::{OutputDef, StepDef};
pub use variable::VariableDef;
