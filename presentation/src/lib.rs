//! Presentation layer for chain-agent
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, NoCallPolicyArg, OutputArg};
pub use output::{ConsoleFormatter, OutputFormatter};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
