//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod capability_handler;
pub mod conversation_logger;
pub mod model_backend;
pub mod turn_observer;
