//! Normalized model responses.
//!
//! Every backend, whatever its wire format, is folded into [`AgentResponse`]
//! so the orchestrator only ever sees one shape.
//!
//! ```text
//! OpenAI:  choices[0].message.{content, tool_calls[]}   ─┐
//! Gemini:  candidates[0].content.parts[{text|functionCall}] ─┴─► AgentResponse
//! ```

use crate::capability::ProposedCall;
use serde::{Deserialize, Serialize};

/// What the model answered on the interpretation call.
///
/// Either plain text, or one or more proposed calls with optional
/// accompanying text.
///
/// # Examples
///
/// ```
/// use chain_agent_domain::agent::AgentResponse;
/// use chain_agent_domain::capability::ProposedCall;
///
/// let text = AgentResponse::from_parts(Some("Hello!".into()), vec![]);
/// assert!(!text.has_calls());
/// assert_eq!(text.text(), Some("Hello!"));
///
/// let calls = AgentResponse::from_parts(
///     None,
///     vec![ProposedCall::new("call-1", "getLatestBlock")],
/// );
/// assert_eq!(calls.proposed_calls().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentResponse {
    /// Free text only; no capability was proposed.
    Text { content: String },
    /// At least one proposed call.
    Calls {
        calls: Vec<ProposedCall>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl AgentResponse {
    pub fn text_only(content: impl Into<String>) -> Self {
        AgentResponse::Text {
            content: content.into(),
        }
    }

    /// Build from whatever a backend extracted. An empty call list yields
    /// [`AgentResponse::Text`]; blank accompanying text is dropped.
    pub fn from_parts(text: Option<String>, calls: Vec<ProposedCall>) -> Self {
        let text = text.filter(|t| !t.trim().is_empty());
        if calls.is_empty() {
            AgentResponse::Text {
                content: text.unwrap_or_default(),
            }
        } else {
            AgentResponse::Calls { calls, text }
        }
    }

    pub fn proposed_calls(&self) -> &[ProposedCall] {
        match self {
            AgentResponse::Text { .. } => &[],
            AgentResponse::Calls { calls, .. } => calls,
        }
    }

    pub fn into_calls(self) -> Vec<ProposedCall> {
        match self {
            AgentResponse::Text { .. } => Vec::new(),
            AgentResponse::Calls { calls, .. } => calls,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            AgentResponse::Text { content } => Some(content),
            AgentResponse::Calls { text, .. } => text.as_deref(),
        }
    }

    pub fn has_calls(&self) -> bool {
        matches!(self, AgentResponse::Calls { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_calls_become_text() {
        let response = AgentResponse::from_parts(None, vec![]);
        assert_eq!(response, AgentResponse::text_only(""));
        assert!(response.proposed_calls().is_empty());
    }

    #[test]
    fn test_blank_text_alongside_calls_is_dropped() {
        let response = AgentResponse::from_parts(
            Some("   ".to_string()),
            vec![ProposedCall::new("call-1", "getBalance")],
        );
        assert!(response.has_calls());
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_calls_keep_order() {
        let response = AgentResponse::from_parts(
            Some("Checking both".to_string()),
            vec![
                ProposedCall::new("call-1", "getBalance"),
                ProposedCall::new("call-2", "getLatestBlock"),
            ],
        );
        let names: Vec<&str> = response
            .proposed_calls()
            .iter()
            .map(|c| c.capability_name.as_str())
            .collect();
        assert_eq!(names, vec!["getBalance", "getLatestBlock"]);
        assert_eq!(response.text(), Some("Checking both"));
        assert_eq!(response.into_calls().len(), 2);
    }
}
