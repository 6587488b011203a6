//! Model provider adapter.
//!
//! Wraps a [`ModelBackend`] with the two calls a turn makes:
//!
//! ```text
//! interpret:  [system] + context + [user query]              + tools ─► AgentResponse
//! finalize:   context + [user query] + [assistant: results]
//!             + [user: synthesis request]                            ─► text
//! ```

use crate::ports::model_backend::{BackendError, CompletionRequest, ModelBackend, ToolChoice};
use chain_agent_domain::util::preview;
use chain_agent_domain::{
    AgentResponse, CapabilityRegistry, ChainPromptTemplate, ConversationContext, ExecutionResult,
    FALLBACK_RESPONSE, Message,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Errors that end a turn during interpretation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for InterpretError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Authentication(msg) => InterpretError::Authentication(msg),
            BackendError::ModelNotFound(msg) => InterpretError::ModelUnavailable(msg),
            other => InterpretError::Backend(other),
        }
    }
}

/// Turns queries into [`AgentResponse`]s and results into answers.
#[derive(Clone)]
pub struct ModelAdapter {
    backend: Arc<dyn ModelBackend>,
    registry: Arc<CapabilityRegistry>,
}

impl ModelAdapter {
    pub fn new(backend: Arc<dyn ModelBackend>, registry: Arc<CapabilityRegistry>) -> Self {
        Self { backend, registry }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// First model call: expose every capability and let the model decide.
    pub async fn interpret(
        &self,
        query: &str,
        context: &ConversationContext,
    ) -> Result<AgentResponse, InterpretError> {
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(Message::system(ChainPromptTemplate::system()));
        messages.extend(context.messages().cloned());
        messages.push(Message::user(query));

        let request = CompletionRequest::new(messages)
            .with_tools(self.registry.list().to_vec())
            .with_tool_choice(ToolChoice::Auto);

        debug!(
            "Interpreting with {} ({}): {} context messages, {} tools",
            self.backend.name(),
            self.backend.model(),
            context.len(),
            request.tools.len()
        );

        match self.backend.complete(&request).await {
            Ok(response) => Ok(response),
            Err(err @ (BackendError::Authentication(_) | BackendError::ModelNotFound(_))) => {
                Err(err.into())
            }
            Err(err) => {
                error!("Interpretation failed on {}: {}", self.backend.name(), err);
                Err(err.into())
            }
        }
    }

    /// Second model call: synthesize an answer from the execution results.
    ///
    /// Replays the pre-turn context. Blank model output yields
    /// [`FALLBACK_RESPONSE`].
    pub async fn generate_final_response(
        &self,
        query: &str,
        results: &[ExecutionResult],
        context: &ConversationContext,
    ) -> Result<String, BackendError> {
        let mut messages = Vec::with_capacity(context.len() + 3);
        messages.extend(context.messages().cloned());
        messages.push(Message::user(query));
        messages.push(Message::assistant(ChainPromptTemplate::results_message(
            results,
        )));
        messages.push(Message::user(ChainPromptTemplate::synthesis_request()));

        let request = CompletionRequest::new(messages).with_tool_choice(ToolChoice::None);
        let response = self.backend.complete(&request).await?;

        let text = response.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            debug!("Finalization returned no text, using fallback");
            return Ok(FALLBACK_RESPONSE.to_string());
        }
        debug!("Final response: {}", preview(text, 120));
        Ok(text.to_string())
    }
}
