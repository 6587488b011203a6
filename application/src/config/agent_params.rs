//! Agent parameters: turn loop control.
//!
//! [`AgentParams`] groups the static parameters that control turns in
//! [`SessionManager`](crate::use_cases::session_manager::SessionManager).

use chain_agent_domain::{DEFAULT_CONTEXT_CAPACITY, NoCallPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default caller-level timeout around a whole turn.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(120);

/// Turn loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Messages kept in each session's context.
    pub context_capacity: usize,
    /// Behaviour when the model proposes no calls.
    pub no_call_policy: NoCallPolicy,
    /// Timeout around interpret → execute → finalize; `None` disables it.
    pub turn_timeout: Option<Duration>,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            context_capacity: DEFAULT_CONTEXT_CAPACITY,
            no_call_policy: NoCallPolicy::default(),
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
        }
    }
}

impl AgentParams {
    // ==================== Builder Methods ====================

    pub fn with_context_capacity(mut self, capacity: usize) -> Self {
        self.context_capacity = capacity;
        self
    }

    pub fn with_no_call_policy(mut self, policy: NoCallPolicy) -> Self {
        self.no_call_policy = policy;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = AgentParams::default();
        assert_eq!(params.context_capacity, 10);
        assert_eq!(params.no_call_policy, NoCallPolicy::ShortCircuit);
        assert_eq!(params.turn_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_builder() {
        let params = AgentParams::default()
            .with_context_capacity(4)
            .with_no_call_policy(NoCallPolicy::Finalize)
            .with_turn_timeout(None);
        assert_eq!(params.context_capacity, 4);
        assert_eq!(params.no_call_policy, NoCallPolicy::Finalize);
        assert!(params.turn_timeout.is_none());
    }
}
