//! Argument validation
//!
//! Pure checks of proposed call arguments against the registry's
//! required-field contracts. The async dispatch port lives in the
//! application layer.

use super::call::ProposedCall;
use super::entities::CapabilityRegistry;
use thiserror::Error;

/// Why a proposed call may not be executed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Received unknown function: {0}")]
    UnknownCapability(String),

    #[error("Missing required arguments for {capability}: {}", .fields.join(", "))]
    MissingRequiredArgument {
        capability: String,
        fields: Vec<String>,
    },
}

/// Validator for proposed calls
pub trait ArgumentValidator: Send + Sync {
    /// Validate a call against the registry. Unknown capabilities are invalid.
    fn validate(
        &self,
        registry: &CapabilityRegistry,
        call: &ProposedCall,
    ) -> Result<(), ValidationError>;
}

/// Presence check on every required field, no type coercion.
///
/// Extra arguments the schema does not declare are tolerated; models
/// routinely add them and handlers ignore what they don't read.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFieldValidator;

impl ArgumentValidator for RequiredFieldValidator {
    fn validate(
        &self,
        registry: &CapabilityRegistry,
        call: &ProposedCall,
    ) -> Result<(), ValidationError> {
        let spec = registry
            .get(&call.capability_name)
            .ok_or_else(|| ValidationError::UnknownCapability(call.capability_name.clone()))?;

        let missing: Vec<String> = spec
            .required_parameters()
            .filter(|name| !call.has_arg(name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingRequiredArgument {
                capability: spec.name.clone(),
                fields: missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::entities::{CapabilityParameter, CapabilitySpec, ParameterType};

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::builder()
            .register(
                CapabilitySpec::new("transferToken", "Transfer tokens")
                    .with_parameter(CapabilityParameter::new("to", "Recipient", true))
                    .with_parameter(
                        CapabilityParameter::new("amount", "Amount", true)
                            .with_type(ParameterType::Number),
                    )
                    .with_parameter(CapabilityParameter::new("symbol", "Symbol", false)),
            )
            .register(CapabilitySpec::new("getLatestBlock", "Latest block"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_to_is_reported() {
        let call = ProposedCall::new("call-1", "transferToken").with_arg("amount", 1);
        let err = RequiredFieldValidator
            .validate(&registry(), &call)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredArgument {
                capability: "transferToken".to_string(),
                fields: vec!["to".to_string()],
            }
        );
        assert_eq!(
            err.to_string(),
            "Missing required arguments for transferToken: to"
        );
    }

    #[test]
    fn test_all_missing_fields_listed_in_order() {
        let call = ProposedCall::new("call-1", "transferToken");
        let err = RequiredFieldValidator
            .validate(&registry(), &call)
            .unwrap_err();
        assert!(err.to_string().ends_with("to, amount"));
    }

    #[test]
    fn test_unknown_capability_fails_closed() {
        let call = ProposedCall::new("call-1", "launchRocket");
        assert_eq!(
            RequiredFieldValidator.validate(&registry(), &call),
            Err(ValidationError::UnknownCapability("launchRocket".to_string()))
        );
    }

    #[test]
    fn test_presence_only_no_type_coercion() {
        // Wrong types still pass; presence is all that is checked.
        let call = ProposedCall::new("call-1", "transferToken")
            .with_arg("to", 42)
            .with_arg("amount", "lots")
            .with_arg("extra", true);
        assert!(RequiredFieldValidator.validate(&registry(), &call).is_ok());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let registry = registry();
        let ok = ProposedCall::new("a", "getLatestBlock");
        let bad = ProposedCall::new("b", "transferToken").with_arg("to", "0x1");
        for _ in 0..3 {
            assert!(RequiredFieldValidator.validate(&registry, &ok).is_ok());
            assert_eq!(
                RequiredFieldValidator.validate(&registry, &bad),
                RequiredFieldValidator.validate(&registry, &bad)
            );
        }
    }
}
