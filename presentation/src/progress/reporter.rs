//! Progress reporting for turn execution

use chain_agent_application::TurnObserver;
use chain_agent_domain::{ExecutionResult, ProposedCall, TurnPhase};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Spinner that follows the turn through its phases
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        let mut guard = self
            .spinner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let spinner = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        f(spinner);
    }

    fn finish(&self) {
        let spinner = self
            .spinner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

impl TurnObserver for ProgressReporter {
    fn on_phase(&self, phase: TurnPhase) {
        if phase.is_terminal() {
            self.finish();
            return;
        }
        self.with_spinner(|pb| {
            pb.set_prefix(phase.display_name().to_string());
            pb.set_message("");
        });
    }

    fn on_call_started(&self, call: &ProposedCall) {
        self.with_spinner(|pb| pb.set_message(call.capability_name.clone()));
    }

    fn on_call_result(&self, call: &ProposedCall, result: &ExecutionResult) {
        let mark = if result.is_success() {
            "v".green()
        } else {
            "x".red()
        };
        self.with_spinner(|pb| pb.println(format!("  {} {}", mark, call.capability_name)));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl TurnObserver for SimpleProgress {
    fn on_phase(&self, phase: TurnPhase) {
        if !phase.is_terminal() {
            eprintln!("{} {}", "->".cyan(), phase.display_name().bold());
        }
    }

    fn on_call_result(&self, call: &ProposedCall, result: &ExecutionResult) {
        if result.is_success() {
            eprintln!("  {} {}", "v".green(), call.capability_name);
        } else {
            eprintln!(
                "  {} {} ({})",
                "x".red(),
                call.capability_name,
                result.message().unwrap_or("failed")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reporter_survives_full_turn() {
        let reporter = ProgressReporter::new();
        let call = ProposedCall::new("call-1", "getLatestBlock");

        reporter.on_phase(TurnPhase::AwaitingInterpretation);
        reporter.on_phase(TurnPhase::HasCalls);
        reporter.on_call_started(&call);
        reporter.on_call_result(&call, &ExecutionResult::success(json!({"blockNumber": 1})));
        reporter.on_phase(TurnPhase::Finalizing);
        reporter.on_phase(TurnPhase::Done);

        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}
