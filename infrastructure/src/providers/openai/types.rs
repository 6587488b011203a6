//! Wire types for the OpenAI chat completions API and their conversion
//! to and from domain types.

use chain_agent_application::{BackendError, CompletionRequest, ToolChoice};
use chain_agent_domain::{AgentResponse, CapabilitySpec, Message, ProposedCall};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub function: FunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    pub arguments: String,
}

// ─── Domain → OpenAI ─────────────────────────────────────────────

pub fn convert_message(message: &Message) -> ChatMessage {
    ChatMessage {
        role: message.role.as_str(),
        content: message.content.clone(),
    }
}

pub fn convert_tool(spec: &CapabilitySpec) -> ToolDefinition {
    ToolDefinition {
        kind: "function",
        function: FunctionDefinition {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters_schema(),
        },
    }
}

pub fn build_chat_request(model: &str, request: &CompletionRequest) -> ChatRequest {
    let tools: Vec<ToolDefinition> = request.tools.iter().map(convert_tool).collect();
    let tool_choice = if tools.is_empty() {
        None
    } else {
        Some(match request.tool_choice {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
        })
    };

    ChatRequest {
        model: model.to_string(),
        messages: request.messages.iter().map(convert_message).collect(),
        tools,
        tool_choice,
    }
}

// ─── OpenAI → Domain ─────────────────────────────────────────────

/// Decode the JSON-encoded argument string of a tool call.
///
/// Blank input is an empty object. Anything that is not a JSON object is
/// logged and replaced by an empty object, so validation reports the
/// missing fields instead of the turn failing.
pub fn parse_arguments(name: &str, raw: &str) -> Map<String, Value> {
    if raw.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("Arguments for {} are not an object: {}", name, other);
            Map::new()
        }
        Err(e) => {
            warn!("Failed to parse arguments for {}: {}", name, e);
            Map::new()
        }
    }
}

pub fn convert_chat_response(response: ChatResponse) -> Result<AgentResponse, BackendError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidResponse("response has no choices".to_string()))?;

    let calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, call)| {
            let id = call
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call-{}", i + 1));
            let arguments = parse_arguments(&call.function.name, &call.function.arguments);
            ProposedCall::new(id, call.function.name).with_arguments(arguments)
        })
        .collect();

    Ok(AgentResponse::from_parts(choice.message.content, calls))
}
