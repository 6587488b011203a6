//! OpenAI-compatible chat completions backend.

pub mod types;

use crate::providers::http::send_json;
use async_trait::async_trait;
use chain_agent_application::{BackendError, CompletionRequest, ModelBackend};
use chain_agent_domain::{AgentResponse, Model};
use reqwest::Client;
use tracing::debug;
use types::{ChatResponse, build_chat_request, convert_chat_response};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Bearer-authenticated `POST {base_url}/v1/chat/completions` backend.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: Model,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: Model::default_openai(),
        }
    }

    /// Set a custom base URL (proxies, Azure-style gateways, local servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &Model {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AgentResponse, BackendError> {
        let body = build_chat_request(self.model.as_str(), request);
        debug!(
            "OpenAI request: model={}, {} messages, {} tools",
            body.model,
            body.messages.len(),
            body.tools.len()
        );

        let http = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body);
        let response: ChatResponse = send_json(self.name(), http).await?;
        convert_chat_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_backend() {
        let backend = OpenAiBackend::new("test_key");
        assert_eq!(backend.api_key, "test_key");
        assert_eq!(backend.model, Model::Gpt4Turbo);
        assert_eq!(backend.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_chained_builders() {
        let backend = OpenAiBackend::new("test_key")
            .with_base_url("http://localhost:8080/")
            .with_model(Model::Gpt4o);
        assert_eq!(backend.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(backend.model().as_str(), "gpt-4o");
        assert_eq!(backend.name(), "openai");
    }
}
