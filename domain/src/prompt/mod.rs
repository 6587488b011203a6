//! Prompt domain
//!
//! The system prompt, the finalization templates and the fallback answer.

pub mod chain;

pub use chain::{ChainPromptTemplate, FALLBACK_RESPONSE};
