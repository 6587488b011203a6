//! Model backend adapters and the factory that picks one from config.

pub mod gemini;
mod http;
pub mod openai;

pub use gemini::{GeminiBackend, GeminiEndpoint};
pub use openai::OpenAiBackend;

use crate::config::{ConfigError, FileProvidersConfig};
use chain_agent_application::ModelBackend;
use chain_agent_domain::Model;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Which backend serves the turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Gemini,
    VertexAi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
        ProviderKind::VertexAi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::VertexAi => "vertexai",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            "vertexai" | "vertex" => Ok(ProviderKind::VertexAi),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Build the backend for `kind`, optionally overriding the configured model.
///
/// Fails when the provider's credential (API key, project id or access
/// token) cannot be resolved.
pub fn create_backend(
    config: &FileProvidersConfig,
    kind: ProviderKind,
    model_override: Option<&str>,
) -> Result<Arc<dyn ModelBackend>, ConfigError> {
    let backend: Arc<dyn ModelBackend> = match kind {
        ProviderKind::OpenAi => {
            let cfg = &config.openai;
            let api_key = cfg
                .resolve_api_key()
                .ok_or_else(|| ConfigError::missing_credential("openai", &cfg.api_key_env))?;
            let model = Model::from(model_override.unwrap_or(&cfg.model));
            Arc::new(
                OpenAiBackend::new(api_key)
                    .with_client(http_client(cfg.timeout_secs)?)
                    .with_base_url(&cfg.base_url)
                    .with_model(model),
            )
        }
        ProviderKind::Gemini => {
            let cfg = &config.gemini;
            let api_key = cfg
                .resolve_api_key()
                .ok_or_else(|| ConfigError::missing_credential("gemini", &cfg.api_key_env))?;
            let model = Model::from(model_override.unwrap_or(&cfg.model));
            Arc::new(
                GeminiBackend::new(api_key)
                    .with_client(http_client(cfg.timeout_secs)?)
                    .with_base_url(&cfg.base_url)
                    .with_model(model),
            )
        }
        ProviderKind::VertexAi => {
            let cfg = &config.vertexai;
            let project_id = cfg.resolve_project_id().ok_or_else(|| {
                ConfigError::missing_credential("vertexai", &cfg.project_id_env)
            })?;
            let access_token = cfg.resolve_access_token().ok_or_else(|| {
                ConfigError::missing_credential("vertexai", &cfg.access_token_env)
            })?;
            let model = Model::from(model_override.unwrap_or(&cfg.model));
            Arc::new(
                GeminiBackend::vertex(project_id, access_token)
                    .with_client(http_client(cfg.timeout_secs)?)
                    .with_location(&cfg.location)
                    .with_model(model),
            )
        }
    };

    info!("Using {} backend with model {}", backend.name(), backend.model());
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileOpenAiConfig, FileVertexAiConfig};

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("vertex".parse::<ProviderKind>().unwrap(), ProviderKind::VertexAi);
        assert!(matches!(
            "bedrock".parse::<ProviderKind>(),
            Err(ConfigError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_create_openai_with_inline_key() {
        let config = FileProvidersConfig {
            openai: FileOpenAiConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let backend = create_backend(&config, ProviderKind::OpenAi, Some("gpt-4o")).unwrap();
        assert_eq!(backend.name(), "openai");
        assert_eq!(backend.model(), &Model::Gpt4o);
    }

    #[test]
    fn test_missing_credential() {
        let config = FileProvidersConfig {
            openai: FileOpenAiConfig {
                api_key_env: "CHAIN_AGENT_TEST_NO_SUCH_KEY".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = create_backend(&config, ProviderKind::OpenAi, None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("CHAIN_AGENT_TEST_NO_SUCH_KEY"));
    }

    #[test]
    fn test_vertex_requires_project() {
        let config = FileProvidersConfig {
            vertexai: FileVertexAiConfig {
                project_id: None,
                project_id_env: "CHAIN_AGENT_TEST_NO_SUCH_PROJECT".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            create_backend(&config, ProviderKind::VertexAi, None),
            Err(ConfigError::MissingCredential { .. })
        ));
    }
}
