//! Error types for the chain adapters

use chain_agent_application::CapabilityError;
use thiserror::Error;

/// Errors raised while serving a blockchain capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Explorer error: {0}")]
    Explorer(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode {what}: {detail}")]
    Decode { what: &'static str, detail: String },
}

impl ChainError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ChainError::InvalidInput(message.into())
    }

    pub fn decode(what: &'static str, detail: impl ToString) -> Self {
        ChainError::Decode {
            what,
            detail: detail.to_string(),
        }
    }
}

/// Bad input and node/explorer refusals are domain failures the user can
/// act on; transport and decoding problems are not.
impl From<ChainError> for CapabilityError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Transport(_) | ChainError::Decode { .. } => {
                CapabilityError::unexpected(err.to_string())
            }
            other => CapabilityError::domain(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        ChainError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_error_classification() {
        let err: CapabilityError = ChainError::invalid("Invalid address: 0x12").into();
        assert_eq!(err, CapabilityError::domain("Invalid address: 0x12"));

        let err: CapabilityError = ChainError::NotConfigured("chain.dex_router_address").into();
        assert_eq!(
            err,
            CapabilityError::domain("chain.dex_router_address is not configured")
        );

        let err: CapabilityError = ChainError::Transport("connection refused".into()).into();
        assert!(matches!(err, CapabilityError::Unexpected(_)));
    }
}
