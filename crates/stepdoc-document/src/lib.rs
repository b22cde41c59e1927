//! Stepdoc Document
//!
//! An ordered list of steps plus typed parameters and document outputs.
//! [`DocumentBuilder`] performs the static checks (every reference names an
//! earlier step's declared output or a declared parameter, with matching
//! types) and [`Document::print`] renders the serialized form.
//! [`load_document`] builds a document from its JSON authoring format.

mod builder;
mod document;
mod error;
mod loader;
mod parameter;

pub use builder::DocumentBuilder;
pub use document::{Document, SerializedDocument};
pub use error::DocumentError;
pub use loader::load_document;
pub use parameter::{Parameter, ParameterEntry};
