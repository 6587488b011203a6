//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod chain;
mod logging;
mod output;
mod providers;
mod repl;

pub use agent::FileAgentConfig;
pub use chain::FileChainConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use providers::{FileGeminiConfig, FileOpenAiConfig, FileProvidersConfig, FileVertexAiConfig};
pub use repl::FileReplConfig;

use crate::providers::ProviderKind;
use chain_agent_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Turn loop settings
    pub agent: FileAgentConfig,
    /// Model backend settings
    pub providers: FileProvidersConfig,
    /// Node, explorer and contract addresses
    pub chain: FileChainConfig,
    /// Conversation transcript settings
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.agent.validate();

        if self.providers.default.parse::<ProviderKind>().is_err() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidEnumValue {
                    field: "providers.default".to_string(),
                    value: self.providers.default.clone(),
                    valid_values: ProviderKind::ALL
                        .iter()
                        .map(|k| k.as_str().to_string())
                        .collect(),
                },
                format!(
                    "providers.default: unknown provider '{}'",
                    self.providers.default
                ),
            ));
        }

        for (field, value) in [
            ("providers.openai.model", &self.providers.openai.model),
            ("providers.gemini.model", &self.providers.gemini.model),
            ("providers.vertexai.model", &self.providers.vertexai.model),
            ("chain.rpc_url", &self.chain.rpc_url),
        ] {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: field.to_string(),
                    },
                    format!("{} cannot be empty", field),
                ));
            }
        }

        for (field, secs) in [
            ("chain.request_timeout_secs", self.chain.request_timeout_secs),
            ("providers.openai.timeout_secs", self.providers.openai.timeout_secs),
            ("providers.gemini.timeout_secs", self.providers.gemini.timeout_secs),
            ("providers.vertexai.timeout_secs", self.providers.vertexai.timeout_secs),
        ] {
            if secs == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout {
                        field: field.to_string(),
                    },
                    format!("{} cannot be 0", field),
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_agent_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[agent]
context_capacity = 6
no_call_policy = "finalize"
turn_timeout_secs = 30

[providers]
default = "vertexai"

[providers.vertexai]
project_id = "my-project"
location = "europe-west4"

[chain]
rpc_url = "http://localhost:8545"
chain_id = 31337
dex_router_address = "0x1111111111111111111111111111111111111111"

[logging]
conversation_log = true
dir = "/tmp/chain-agent"

[output]
format = "json"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.context_capacity, 6);
        assert_eq!(config.providers.default, "vertexai");
        assert_eq!(
            config.providers.vertexai.project_id.as_deref(),
            Some("my-project")
        );
        assert_eq!(config.providers.vertexai.location, "europe-west4");
        // untouched sub-sections keep defaults
        assert_eq!(config.providers.openai.model, "gpt-4-turbo");
        assert_eq!(config.chain.chain_id, 31337);
        assert!(config.chain.wrapped_native_address.is_none());
        assert!(config.logging.conversation_log);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.chain.rpc_url, "https://evm-t3.cronos.org");
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let mut config = FileConfig::default();
        config.agent.context_capacity = 0;
        config.providers.default = "bedrock".to_string();
        config.chain.rpc_url = " ".to_string();
        config.chain.request_timeout_secs = 0;

        let issues = config.validate();
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(|i| i.is_error()));
        assert!(
            issues
                .iter()
                .any(|i| i.message.contains("unknown provider 'bedrock'"))
        );
    }
}
