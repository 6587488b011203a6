//! Turn lifecycle value objects

use crate::capability::{ExecutionResult, ProposedCall};
use serde::{Deserialize, Serialize};

/// Phase of a single turn
///
/// ```text
/// AwaitingInterpretation ─┬─► HasCalls ─┬─► Finalizing ─► Done
///                         └─► NoCalls ──┘
///            (any phase) ───────────────────► Errored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingInterpretation,
    HasCalls,
    NoCalls,
    Finalizing,
    Done,
    Errored,
}

impl TurnPhase {
    pub fn as_str(&self) -> &str {
        match self {
            TurnPhase::AwaitingInterpretation => "awaiting_interpretation",
            TurnPhase::HasCalls => "has_calls",
            TurnPhase::NoCalls => "no_calls",
            TurnPhase::Finalizing => "finalizing",
            TurnPhase::Done => "done",
            TurnPhase::Errored => "errored",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            TurnPhase::AwaitingInterpretation => "Interpreting",
            TurnPhase::HasCalls => "Executing",
            TurnPhase::NoCalls => "No calls",
            TurnPhase::Finalizing => "Finalizing",
            TurnPhase::Done => "Done",
            TurnPhase::Errored => "Errored",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Done | TurnPhase::Errored)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        match (self, next) {
            (Done | Errored, _) => false,
            (_, Errored) => true,
            (AwaitingInterpretation, HasCalls | NoCalls) => true,
            (HasCalls | NoCalls, Finalizing) => true,
            // short-circuit skips the second model call
            (NoCalls, Done) => true,
            (Finalizing, Done) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do when the model proposes no calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoCallPolicy {
    /// The model's free text is the final answer.
    #[default]
    ShortCircuit,
    /// Run the finalization call anyway, with an empty result set.
    Finalize,
}

impl NoCallPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            NoCallPolicy::ShortCircuit => "short-circuit",
            NoCallPolicy::Finalize => "finalize",
        }
    }
}

impl std::fmt::Display for NoCallPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NoCallPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short-circuit" | "short_circuit" | "shortcircuit" => Ok(NoCallPolicy::ShortCircuit),
            "finalize" => Ok(NoCallPolicy::Finalize),
            other => Err(format!(
                "Unknown no-call policy '{}' (expected short-circuit or finalize)",
                other
            )),
        }
    }
}

/// Result of a completed turn.
///
/// Serializes as `{"finalResponse", "results", "hasErrors"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub final_response: String,
    #[serde(rename = "results")]
    pub execution_results: Vec<ExecutionResult>,
    pub has_errors: bool,
    /// Calls the results pair with, index for index.
    #[serde(skip)]
    pub proposed_calls: Vec<ProposedCall>,
    /// True when the free-text answer was returned without finalization.
    #[serde(skip)]
    pub short_circuited: bool,
}

impl TurnOutcome {
    pub fn new(
        final_response: impl Into<String>,
        proposed_calls: Vec<ProposedCall>,
        execution_results: Vec<ExecutionResult>,
    ) -> Self {
        let has_errors = execution_results.iter().any(ExecutionResult::is_failed);
        Self {
            final_response: final_response.into(),
            execution_results,
            has_errors,
            proposed_calls,
            short_circuited: false,
        }
    }

    pub fn short_circuit(final_response: impl Into<String>) -> Self {
        Self {
            short_circuited: true,
            ..Self::new(final_response, Vec::new(), Vec::new())
        }
    }

    /// Pairs of (call, result) in proposal order.
    pub fn call_results(&self) -> impl Iterator<Item = (&ProposedCall, &ExecutionResult)> {
        self.proposed_calls.iter().zip(&self.execution_results)
    }
}
