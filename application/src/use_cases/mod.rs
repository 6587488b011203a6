//! Use cases (application services)
//!
//! - [`model_adapter`] - interpret / finalize calls against a model backend
//! - [`execute_capability`] - handler table and capability executor
//! - [`run_turn`] - the turn state machine
//! - [`session_manager`] - per-session state and the caller boundary

pub mod execute_capability;
pub mod model_adapter;
pub mod run_turn;
pub mod session_manager;
