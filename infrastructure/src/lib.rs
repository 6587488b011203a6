//! Infrastructure layer for chain-agent
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: model backends, blockchain handlers, the conversation
//! transcript writer and configuration file loading.

pub mod chain;
pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use chain::{ChainError, ChainSettings, ChainToolkit, register_blockchain_handlers};
pub use config::{
    ConfigError, ConfigLoader, FileAgentConfig, FileChainConfig, FileConfig, FileLoggingConfig,
    FileOutputConfig, FileProvidersConfig, FileReplConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::{GeminiBackend, OpenAiBackend, ProviderKind, create_backend};
