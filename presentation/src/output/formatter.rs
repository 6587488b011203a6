//! Output formatter trait

use chain_agent_domain::TurnOutcome;

/// Trait for rendering a turn outcome
pub trait OutputFormatter {
    /// Human-readable answer with a summary of capability results
    fn format(&self, outcome: &TurnOutcome) -> String;

    /// `{"finalResponse", "results", "hasErrors"}`
    fn format_json(&self, outcome: &TurnOutcome) -> String;
}
