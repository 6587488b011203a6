//! Conversation domain.
//!
//! - [`entities::Message`] - a role-tagged message exchanged with the model
//! - [`context::ConversationContext`] - the bounded rolling history replayed
//!   to the model on every turn

pub mod context;
pub mod entities;

pub use context::{ConversationContext, DEFAULT_CONTEXT_CAPACITY};
pub use entities::{Message, Role};
