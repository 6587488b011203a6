//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// Read a credential: the inline value wins, then the named env var.
fn resolve_secret(inline: Option<&str>, env_name: &str) -> Option<String> {
    inline
        .map(str::to_string)
        .or_else(|| std::env::var(env_name).ok())
        .filter(|v| !v.trim().is_empty())
}

/// OpenAI-compatible chat completions settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended; use the env var instead).
    pub api_key: Option<String>,
    /// Base URL, without the `/v1/chat/completions` suffix.
    pub base_url: String,
    /// Model id (default: "gpt-4-turbo").
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4-turbo".to_string(),
            timeout_secs: 60,
        }
    }
}

impl FileOpenAiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Gemini API (Google AI Studio) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model id (default: "gemini-1.5-pro").
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-pro".to_string(),
            timeout_secs: 60,
        }
    }
}

impl FileGeminiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Vertex AI settings.
///
/// Requests go to the regional endpoint with a bearer token, e.g. the output
/// of `gcloud auth print-access-token` exported as `VERTEX_ACCESS_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVertexAiConfig {
    pub project_id: Option<String>,
    /// Environment variable consulted when `project_id` is unset.
    pub project_id_env: String,
    /// Region (default: "us-central1").
    pub location: String,
    pub access_token_env: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for FileVertexAiConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            project_id_env: "GOOGLE_CLOUD_PROJECT".to_string(),
            location: "us-central1".to_string(),
            access_token_env: "VERTEX_ACCESS_TOKEN".to_string(),
            model: "gemini-1.5-pro".to_string(),
            timeout_secs: 60,
        }
    }
}

impl FileVertexAiConfig {
    pub fn resolve_project_id(&self) -> Option<String> {
        resolve_secret(self.project_id.as_deref(), &self.project_id_env)
    }

    pub fn resolve_access_token(&self) -> Option<String> {
        resolve_secret(None, &self.access_token_env)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Backend to use: "openai", "gemini" or "vertexai".
    pub default: String,
    pub openai: FileOpenAiConfig,
    pub gemini: FileGeminiConfig,
    pub vertexai: FileVertexAiConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            default: "openai".to_string(),
            openai: FileOpenAiConfig::default(),
            gemini: FileGeminiConfig::default(),
            vertexai: FileVertexAiConfig::default(),
        }
    }
}
