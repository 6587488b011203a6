//! Wire types for `generateContent` (Gemini API and Vertex AI) and their
//! conversion to and from domain types.

use chain_agent_application::{BackendError, CompletionRequest, ToolChoice};
use chain_agent_domain::{AgentResponse, CapabilitySpec, Message, ProposedCall, Role};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub const TEMPERATURE: f32 = 0.1;
pub const TOP_P: f32 = 0.95;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub function_calling_config: FunctionCallingConfig,
}

#[derive(Debug, Serialize)]
pub struct FunctionCallingConfig {
    pub mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

// ─── Domain → Gemini ─────────────────────────────────────────────

/// Native schema type for a JSON Schema type name; unknown names map to STRING.
pub fn schema_type(json_type: &str) -> &'static str {
    match json_type {
        "string" => "STRING",
        "number" => "NUMBER",
        "integer" => "INTEGER",
        "boolean" => "BOOLEAN",
        "object" => "OBJECT",
        _ => "STRING",
    }
}

/// Gemini has no system role and calls the assistant "model".
pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::System | Role::User => "user",
        Role::Assistant => "model",
    }
}

/// Convert messages to contents, merging runs of the same role so the
/// request alternates user/model turns.
///
/// Contents must open with a user turn. A context window that starts on an
/// assistant message (its question already evicted) sends that message as
/// user content.
pub fn convert_messages(messages: &[Message]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::with_capacity(messages.len());
    for message in messages {
        let role = if contents.is_empty() {
            "user"
        } else {
            role_name(message.role)
        };
        let part = Part {
            text: Some(message.content.clone()),
            function_call: None,
        };
        match contents.last_mut() {
            Some(last) if last.role == role => last.parts.push(part),
            _ => contents.push(Content {
                role: role.to_string(),
                parts: vec![part],
            }),
        }
    }
    contents
}

pub fn convert_parameters(spec: &CapabilitySpec) -> Option<Value> {
    if spec.parameters.is_empty() {
        return None;
    }
    let properties: Map<String, Value> = spec
        .parameters
        .iter()
        .map(|p| {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(schema_type(p.param_type.as_str())));
            prop.insert("description".into(), json!(p.description));
            if let Some(values) = &p.enum_values {
                prop.insert("enum".into(), json!(values));
            }
            (p.name.clone(), Value::Object(prop))
        })
        .collect();
    let required: Vec<&str> = spec.required_parameters().collect();

    Some(json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    }))
}

pub fn convert_tools(specs: &[CapabilitySpec]) -> Vec<Tool> {
    if specs.is_empty() {
        return Vec::new();
    }
    vec![Tool {
        function_declarations: specs
            .iter()
            .map(|spec| FunctionDeclaration {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: convert_parameters(spec),
            })
            .collect(),
    }]
}

pub fn build_generate_request(request: &CompletionRequest) -> GenerateContentRequest {
    let tools = convert_tools(&request.tools);
    let tool_config = (!tools.is_empty()).then(|| ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode: match request.tool_choice {
                ToolChoice::Auto => "AUTO",
                ToolChoice::None => "NONE",
            },
        },
    });

    GenerateContentRequest {
        contents: convert_messages(&request.messages),
        tools,
        tool_config,
        generation_config: GenerationConfig::default(),
    }
}

// ─── Gemini → Domain ─────────────────────────────────────────────

pub fn convert_response(response: GenerateContentResponse) -> Result<AgentResponse, BackendError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidResponse("No content generated".to_string()))?;
    let content = candidate.content.ok_or_else(|| {
        BackendError::InvalidResponse(format!(
            "No content generated (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;

    let mut texts = Vec::new();
    let mut calls = Vec::new();
    for part in content.parts {
        if let Some(call) = part.function_call {
            let arguments = match call.args {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            calls.push(
                ProposedCall::new(format!("call-{}", calls.len() + 1), call.name)
                    .with_arguments(arguments),
            );
        } else if let Some(text) = part.text {
            texts.push(text);
        }
    }

    let text = (!texts.is_empty()).then(|| texts.concat());
    Ok(AgentResponse::from_parts(text, calls))
}
