//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Capability '{0}' is registered more than once")]
    DuplicateCapability(String),

    #[error("Parameter '{parameter}' of capability '{capability}' is declared more than once")]
    DuplicateParameter {
        capability: String,
        parameter: String,
    },

    #[error("Context capacity must be at least 2 messages, got {0}")]
    InvalidContextCapacity(usize),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_parameter_display() {
        let error = DomainError::DuplicateParameter {
            capability: "getBalance".to_string(),
            parameter: "address".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Parameter 'address' of capability 'getBalance' is declared more than once"
        );
    }

    #[test]
    fn test_invalid_capacity_display() {
        let error = DomainError::InvalidContextCapacity(1);
        assert!(error.to_string().contains("at least 2"));
    }
}
