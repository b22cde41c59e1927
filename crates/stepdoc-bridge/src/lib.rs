//! Stepdoc Bridge
//!
//! Forwards a function call to an external interpreter and waits for its JSON
//! result. The interpreter runs an entry script with three arguments: the
//! script location, the function name, and the JSON-encoded argument. The
//! entry script prints diagnostics freely and writes its result as the last
//! line of stdout:
//!
//! ```json
//! { "status": "SUCCESS", "Payload": { "count": 3 } }
//! ```
//!
//! A domain failure is a response with `"status": "FAILURE"`. Anything that
//! prevents a response from being read (spawn failure, timeout, non-zero
//! exit, missing or malformed last line) is a [`TransportError`].

mod bridge;
mod error;
mod response;

pub use bridge::{BridgeConfig, ScriptBridge};
pub use error::TransportError;
pub use response::{BridgeResponse, BridgeStatus, parse_output};
