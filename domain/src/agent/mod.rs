//! Agent domain
//!
//! The normalized model response and the value objects describing one
//! interpret → execute → finalize turn.

pub mod response;
pub mod turn;

pub use response::AgentResponse;
pub use turn::{NoCallPolicy, TurnOutcome, TurnPhase};
