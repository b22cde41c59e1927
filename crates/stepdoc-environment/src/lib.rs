//! Stepdoc Environment
//!
//! The pluggable surface a step delegates its side effects to. A step never
//! talks to the outside world directly: it maps its resolved inputs onto one
//! [`Environment`] call and turns the outcome into an [`InvocationResult`].
//!
//! Two implementations ship with the crate:
//! - [`MockEnvironment`] records every call and answers from canned responses.
//! - [`ShellEnvironment`] runs shell commands locally and forwards scripts to
//!   a [`stepdoc_bridge::ScriptBridge`].

mod environment;
mod error;
mod invocation;
mod mock;
mod request;
mod shell;

pub use environment::Environment;
pub use error::EnvironmentError;
pub use invocation::{InvocationResult, ResponseCode};
pub use mock::MockEnvironment;
pub use request::{CommandOutput, ScriptRequest, SendCommandRequest, ShellCommand};
pub use shell::{ShellConfig, ShellEnvironment};
pub use stepdoc_bridge::{BridgeResponse, BridgeStatus};
