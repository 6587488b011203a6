//! Model backend port
//!
//! Defines the interface for chat-completion backends that support tool
//! (function) calling. Each adapter normalizes its provider's wire format
//! into [`AgentResponse`].

use async_trait::async_trait;
use chain_agent_domain::{AgentResponse, CapabilitySpec, Message, Model};
use thiserror::Error;

/// Errors that can occur while talking to a model backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Model not available: {0}")]
    ModelNotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

impl BackendError {
    /// Classify a failed HTTP exchange into a typed error.
    ///
    /// Status codes decide first; providers that report auth or model
    /// problems with a generic status are caught by their messages
    /// ("Incorrect API key provided", "The model `x` does not exist").
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let lower = body.to_lowercase();

        if status == 401
            || status == 403
            || lower.contains("incorrect api key provided")
            || lower.contains("api key not valid")
        {
            return BackendError::Authentication(body);
        }
        if status == 404
            || lower.contains("model_not_found")
            || (lower.contains("the model") && lower.contains("does not exist"))
        {
            return BackendError::ModelNotFound(body);
        }
        if status == 429 {
            return BackendError::RateLimited(body);
        }
        BackendError::Http { status, body }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, BackendError::Authentication(_))
    }

    pub fn is_model_not_found(&self) -> bool {
        matches!(self, BackendError::ModelNotFound(_))
    }
}

/// Whether the model may call tools on this request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides
    #[default]
    Auto,
    /// Text only
    None,
}

/// One chat completion request, provider-neutral
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<CapabilitySpec>,
    pub tool_choice: ToolChoice,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: ToolChoice::Auto,
        }
    }

    pub fn with_tools(mut self, tools: Vec<CapabilitySpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }
}

/// Chat completion backend with tool support
///
/// This port defines how the application layer talks to language models.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Short provider name for logs ("openai", "gemini", ...)
    fn name(&self) -> &str;

    /// The model this backend sends requests to
    fn model(&self) -> &Model;

    /// Send the request and normalize the answer.
    async fn complete(&self, request: &CompletionRequest) -> Result<AgentResponse, BackendError>;
}
