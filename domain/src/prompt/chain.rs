//! Prompt templates for the blockchain agent

use crate::capability::ExecutionResult;
use serde_json::json;

/// Returned when finalization produced no usable text.
pub const FALLBACK_RESPONSE: &str = "Unable to generate response";

/// Templates for the interpret and finalize model calls
pub struct ChainPromptTemplate;

impl ChainPromptTemplate {
    /// System prompt sent at the head of every interpretation call
    pub fn system() -> &'static str {
        "You are an AI assistant that helps users interact with Ethereum and Cronos blockchains. \
         You can use multiple functions if needed to fulfill the user's request."
    }

    /// Synthetic assistant message carrying the serialized results.
    ///
    /// One line per result, numbered from 1 in proposal order:
    /// `Function 1 result: {"status":"Success","data":{...}}`.
    pub fn results_message(results: &[ExecutionResult]) -> String {
        if results.is_empty() {
            return "No functions were called.".to_string();
        }
        results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let json = serde_json::to_string(result).unwrap_or_else(|e| {
                    json!({"status": "Failed", "data": {"message": e.to_string()}}).to_string()
                });
                format!("Function {} result: {}", i + 1, json)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Closing instruction of the finalization call
    pub fn synthesis_request() -> &'static str {
        "Based on the function results above, provide a concise natural-language answer to \
         the user's request. Mention any failures and what the user can do about them."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_prompt_mentions_multiple_functions() {
        assert!(ChainPromptTemplate::system().contains("multiple functions"));
    }

    #[test]
    fn test_results_message_numbering() {
        let message = ChainPromptTemplate::results_message(&[
            ExecutionResult::success(json!({"balance": "2"})),
            ExecutionResult::failed("boom"),
        ]);
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"Function 1 result: {"status":"Success","data":{"balance":"2"}}"#
        );
        assert!(lines[1].starts_with("Function 2 result: "));
        assert!(lines[1].contains("boom"));
    }

    #[test]
    fn test_results_message_empty() {
        assert_eq!(
            ChainPromptTemplate::results_message(&[]),
            "No functions were called."
        );
    }
}
