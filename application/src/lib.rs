//! Application layer for chain-agent
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AgentParams, DEFAULT_TURN_TIMEOUT};
pub use ports::{
    capability_handler::{CapabilityError, CapabilityHandler, SessionScope},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    model_backend::{BackendError, CompletionRequest, ModelBackend, ToolChoice},
    turn_observer::{NoTurnObserver, TurnObserver},
};
pub use use_cases::execute_capability::{
    CapabilityExecutor, HandlerTable, HandlerTableBuilder, HandlerTableError,
};
pub use use_cases::model_adapter::{InterpretError, ModelAdapter};
pub use use_cases::run_turn::{RunTurnInput, RunTurnUseCase, TurnError};
pub use use_cases::session_manager::{SessionManager, update_context};
