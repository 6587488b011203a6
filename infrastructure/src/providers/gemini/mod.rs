//! Google `generateContent` backend: Gemini API and Vertex AI.

pub mod types;

use crate::providers::http::send_json;
use async_trait::async_trait;
use chain_agent_application::{BackendError, CompletionRequest, ModelBackend};
use chain_agent_domain::{AgentResponse, Model};
use reqwest::Client;
use tracing::debug;
use types::{GenerateContentResponse, build_generate_request, convert_response};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VERTEX_LOCATION: &str = "us-central1";

/// Where requests go and how they authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiEndpoint {
    /// Gemini API, `x-goog-api-key` header
    Studio { api_key: String, base_url: String },
    /// Vertex AI regional endpoint, bearer token
    Vertex {
        project_id: String,
        location: String,
        access_token: String,
    },
}

pub struct GeminiBackend {
    client: Client,
    endpoint: GeminiEndpoint,
    model: Model,
}

impl GeminiBackend {
    /// Gemini API backend with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: GeminiEndpoint::Studio {
                api_key: api_key.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            model: Model::default_gemini(),
        }
    }

    /// Vertex AI backend for a project, in the default region.
    pub fn vertex(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: GeminiEndpoint::Vertex {
                project_id: project_id.into(),
                location: DEFAULT_VERTEX_LOCATION.to_string(),
                access_token: access_token.into(),
            },
            model: Model::default_gemini(),
        }
    }

    /// Set a custom base URL. Only meaningful for the Gemini API.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        if let GeminiEndpoint::Studio { base_url, .. } = &mut self.endpoint {
            *base_url = url.into().trim_end_matches('/').to_string();
        }
        self
    }

    /// Set the Vertex AI region.
    pub fn with_location(mut self, region: impl Into<String>) -> Self {
        if let GeminiEndpoint::Vertex { location, .. } = &mut self.endpoint {
            *location = region.into();
        }
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

    fn url(&self) -> String {
        match &self.endpoint {
            GeminiEndpoint::Studio { base_url, .. } => {
                format!("{}/models/{}:generateContent", base_url, self.model)
            }
            GeminiEndpoint::Vertex {
                project_id,
                location,
                ..
            } => format!(
                "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/google/models/{}:generateContent",
                self.model
            ),
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn name(&self) -> &str {
        match self.endpoint {
            GeminiEndpoint::Studio { .. } => "gemini",
            GeminiEndpoint::Vertex { .. } => "vertexai",
        }
    }

    fn model(&self) -> &Model {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<AgentResponse, BackendError> {
        let body = build_generate_request(request);
        debug!(
            "{} request: model={}, {} contents, {} tools",
            self.name(),
            self.model,
            body.contents.len(),
            request.tools.len()
        );

        let http = self.client.post(self.url()).json(&body);
        let http = match &self.endpoint {
            GeminiEndpoint::Studio { api_key, .. } => http.header("x-goog-api-key", api_key),
            GeminiEndpoint::Vertex { access_token, .. } => http.bearer_auth(access_token),
        };

        let response: GenerateContentResponse = send_json(self.name(), http).await?;
        convert_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_url() {
        let backend = GeminiBackend::new("key").with_model(Model::Gemini15Flash);
        assert_eq!(
            backend.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(backend.name(), "gemini");
    }

    #[test]
    fn test_vertex_url() {
        let backend = GeminiBackend::vertex("my-project", "token");
        assert_eq!(
            backend.url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-project/locations/us-central1/publishers/google/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(backend.name(), "vertexai");

        let backend = backend.with_location("europe-west4");
        assert!(backend.url().starts_with("https://europe-west4-aiplatform"));
    }

    #[test]
    fn test_location_ignored_for_studio() {
        let backend = GeminiBackend::new("key")
            .with_location("asia-east1")
            .with_base_url("http://localhost:9000/");
        assert_eq!(
            backend.url(),
            "http://localhost:9000/models/gemini-1.5-pro:generateContent"
        );
    }
}
