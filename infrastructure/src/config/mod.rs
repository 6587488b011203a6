//! Configuration file loading for chain-agent
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CHAIN_AGENT_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./chain-agent.toml` or `./.chain-agent.toml`
//! 4. Global: `$XDG_CONFIG_HOME/chain-agent/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAgentConfig, FileChainConfig, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileOpenAiConfig, FileOutputConfig, FileProvidersConfig, FileReplConfig, FileVertexAiConfig,
};
pub use loader::ConfigLoader;

use chain_agent_domain::ConfigIssue;

/// Errors raised while turning configuration into running components
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Missing credential for {provider}: set {env}")]
    MissingCredential { provider: String, env: String },

    #[error("Unknown provider '{0}' (expected openai, gemini or vertexai)")]
    UnknownProvider(String),

    #[error("Invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigError {
    pub fn missing_credential(provider: impl Into<String>, env: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            env: env.into(),
        }
    }
}
