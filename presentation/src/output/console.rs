//! Console output formatter for turn outcomes

use crate::output::formatter::OutputFormatter;
use chain_agent_domain::util::preview_line;
use chain_agent_domain::{OutputFormat, TurnOutcome};
use colored::Colorize;

/// Formats turn outcomes for console display
pub struct ConsoleFormatter {
    color: bool,
}

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self { color: true }
    }

    /// Disable ANSI colors (e.g. when piping output)
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Render in the requested format.
    pub fn render(&self, outcome: &TurnOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.format(outcome),
            OutputFormat::Json => self.format_json(outcome),
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn results_section(&self, outcome: &TurnOutcome) -> String {
        let mut output = String::new();
        for (call, result) in outcome.call_results() {
            let (mark, detail) = if result.is_success() {
                (
                    self.paint("v", |s| s.green()),
                    preview_line(&result.data.to_string(), 80),
                )
            } else {
                (
                    self.paint("x", |s| s.red()),
                    result.message().unwrap_or("failed").to_string(),
                )
            };
            output.push_str(&format!(
                "  {} {} {}\n",
                mark,
                self.paint(&call.capability_name, |s| s.bold()),
                self.paint(&detail, |s| s.dimmed())
            ));
        }
        output
    }
}

impl Default for ConsoleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &TurnOutcome) -> String {
        let mut output = String::new();
        if !outcome.execution_results.is_empty() {
            output.push_str(&self.paint("Capabilities:", |s| s.cyan().bold()));
            output.push('\n');
            output.push_str(&self.results_section(outcome));
            output.push('\n');
        }
        output.push_str(&outcome.final_response);
        output
    }

    fn format_json(&self, outcome: &TurnOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|e| {
            format!(
                "{{\"finalResponse\":{:?},\"results\":[],\"hasErrors\":true,\"error\":{:?}}}",
                outcome.final_response,
                e.to_string()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_agent_domain::{ExecutionResult, ProposedCall};
    use serde_json::json;

    fn outcome() -> TurnOutcome {
        TurnOutcome::new(
            "You hold 1.5 TCRO; the transfer needs a recipient.",
            vec![
                ProposedCall::new("call-1", "getBalance").with_arg("address", "0xabc"),
                ProposedCall::new("call-2", "transferToken"),
            ],
            vec![
                ExecutionResult::success(json!({"balance": "1.5"})),
                ExecutionResult::failed("Missing required arguments for transferToken: to, amount"),
            ],
        )
    }

    #[test]
    fn test_text_lists_results_then_answer() {
        let text = ConsoleFormatter::new().with_color(false).format(&outcome());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Capabilities:");
        assert!(lines[1].starts_with("  v getBalance"));
        assert!(lines[2].contains("x transferToken Missing required arguments"));
        assert!(text.ends_with("the transfer needs a recipient."));
    }

    #[test]
    fn test_text_without_calls_is_just_the_answer() {
        let text = ConsoleFormatter::new()
            .with_color(false)
            .format(&TurnOutcome::short_circuit("Hello!"));
        assert_eq!(text, "Hello!");
    }

    #[test]
    fn test_json_shape() {
        let json = ConsoleFormatter::new().render(&outcome(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["hasErrors"], true);
        assert_eq!(value["results"][0]["status"], "Success");
        assert_eq!(value["results"][1]["status"], "Failed");
        assert!(value.get("finalResponse").is_some());
    }
}
