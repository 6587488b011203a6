//! Capability domain
//!
//! Capabilities are the named, schema-described operations the model may
//! propose. This module holds the static registry, the proposed-call and
//! result value objects, and the pure argument validator.

pub mod call;
pub mod catalog;
pub mod entities;
pub mod result;
pub mod validation;

pub use call::ProposedCall;
pub use entities::{
    CapabilityParameter, CapabilityRegistry, CapabilityRegistryBuilder, CapabilitySpec,
    ParameterType,
};
pub use result::{ExecutionResult, ExecutionStatus};
pub use validation::{ArgumentValidator, RequiredFieldValidator, ValidationError};
