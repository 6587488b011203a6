//! Interactive chat module
//!
//! Provides a line-editor based chat session bound to one agent session.

mod repl;

pub use repl::ChatRepl;
