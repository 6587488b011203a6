//! Domain layer for chain-agent
//!
//! This crate contains the core types of the function-calling agent. It has
//! no dependencies on infrastructure or presentation concerns and performs
//! no I/O.
//!
//! # Core Concepts
//!
//! ## Capabilities
//!
//! A [`CapabilityRegistry`] is the static catalogue of operations the model
//! may propose. Each [`CapabilitySpec`] describes its parameters once; that
//! description is both what the model sees and what the
//! [`RequiredFieldValidator`] checks.
//!
//! ## Turns
//!
//! One user query goes through interpret → execute → finalize. The model's
//! answer is normalized into an [`AgentResponse`], every [`ProposedCall`]
//! yields one [`ExecutionResult`], and the finished turn is a
//! [`TurnOutcome`].
//!
//! ## Context
//!
//! [`ConversationContext`] is the bounded rolling history replayed to the
//! model on every call.

pub mod agent;
pub mod capability;
pub mod config;
pub mod conversation;
pub mod core;
pub mod prompt;
pub mod session;
pub mod util;
pub mod wallet;

// Re-export commonly used types
pub use agent::{AgentResponse, NoCallPolicy, TurnOutcome, TurnPhase};
pub use capability::{
    ArgumentValidator, CapabilityParameter, CapabilityRegistry, CapabilitySpec, ExecutionResult,
    ExecutionStatus, ParameterType, ProposedCall, RequiredFieldValidator, ValidationError,
    catalog::blockchain_registry,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::{ConversationContext, DEFAULT_CONTEXT_CAPACITY, Message, Role};
pub use core::{error::DomainError, model::Model};
pub use prompt::{ChainPromptTemplate, FALLBACK_RESPONSE};
pub use session::SessionId;
pub use wallet::{WalletContext, WalletRecord};
