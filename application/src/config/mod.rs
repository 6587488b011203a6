//! Application-level configuration.
//!
//! - [`AgentParams`] - turn loop control (context capacity, no-call policy, timeout)

pub mod agent_params;

pub use agent_params::{AgentParams, DEFAULT_TURN_TIMEOUT};
