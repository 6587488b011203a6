//! Agent configuration from TOML (`[agent]` section)

use chain_agent_application::AgentParams;
use chain_agent_domain::{ConfigIssue, ConfigIssueCode, NoCallPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// context_capacity = 10            # messages kept per session
/// no_call_policy = "short-circuit" # "short-circuit" or "finalize"
/// turn_timeout_secs = 120          # 0 is rejected
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub context_capacity: usize,
    pub no_call_policy: String,
    pub turn_timeout_secs: u64,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let params = AgentParams::default();
        Self {
            context_capacity: params.context_capacity,
            no_call_policy: params.no_call_policy.to_string(),
            turn_timeout_secs: params.turn_timeout.map(|d| d.as_secs()).unwrap_or(120),
        }
    }
}

impl FileAgentConfig {
    /// Parse no_call_policy, falling back to short-circuit with a warning.
    pub fn parse_no_call_policy(&self) -> (NoCallPolicy, Vec<ConfigIssue>) {
        match self.no_call_policy.parse::<NoCallPolicy>() {
            Ok(policy) => (policy, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "agent.no_call_policy".to_string(),
                        value: self.no_call_policy.clone(),
                        valid_values: vec!["short-circuit".to_string(), "finalize".to_string()],
                    },
                    format!(
                        "agent.no_call_policy: unknown value '{}', falling back to 'short-circuit'",
                        self.no_call_policy
                    ),
                );
                (NoCallPolicy::default(), vec![issue])
            }
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_no_call_policy().1;
        if self.context_capacity < 2 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ContextCapacityTooSmall {
                    capacity: self.context_capacity,
                },
                format!(
                    "agent.context_capacity must be at least 2, got {}",
                    self.context_capacity
                ),
            ));
        }
        if self.turn_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout {
                    field: "agent.turn_timeout_secs".to_string(),
                },
                "agent.turn_timeout_secs cannot be 0",
            ));
        }
        issues
    }

    pub fn to_agent_params(&self) -> AgentParams {
        AgentParams::default()
            .with_context_capacity(self.context_capacity)
            .with_no_call_policy(self.parse_no_call_policy().0)
            .with_turn_timeout(Some(Duration::from_secs(self.turn_timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FileAgentConfig::default();
        assert_eq!(config.context_capacity, 10);
        assert_eq!(config.no_call_policy, "short-circuit");
        assert_eq!(config.turn_timeout_secs, 120);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_invalid_values_reported() {
        let config = FileAgentConfig {
            context_capacity: 1,
            no_call_policy: "maybe".to_string(),
            turn_timeout_secs: 0,
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 2);
    }

    #[test]
    fn test_to_agent_params() {
        let config = FileAgentConfig {
            context_capacity: 6,
            no_call_policy: "finalize".to_string(),
            turn_timeout_secs: 30,
        };
        let params = config.to_agent_params();
        assert_eq!(params.context_capacity, 6);
        assert_eq!(params.no_call_policy, NoCallPolicy::Finalize);
        assert_eq!(params.turn_timeout, Some(Duration::from_secs(30)));
    }
}
