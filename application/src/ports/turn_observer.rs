//! Turn observation port
//!
//! Callbacks for reporting turn progress. Implementations live in the
//! presentation layer (spinner, plain log lines, ...).

use chain_agent_domain::{ExecutionResult, ProposedCall, TurnPhase};

/// Callback for progress updates during a turn
///
/// Every method has a no-op default so implementations only override
/// what they display.
pub trait TurnObserver: Send + Sync {
    /// Called on every phase transition
    fn on_phase(&self, _phase: TurnPhase) {}

    /// Called before a proposed call is dispatched
    fn on_call_started(&self, _call: &ProposedCall) {}

    /// Called as soon as a call finishes, in completion order
    fn on_call_result(&self, _call: &ProposedCall, _result: &ExecutionResult) {}
}

/// No-op observer for when progress reporting is not needed
pub struct NoTurnObserver;

impl TurnObserver for NoTurnObserver {}
