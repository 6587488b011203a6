//! Blockchain access: JSON-RPC node, explorer API, transaction building and
//! the capability handlers on top of them.

pub mod abi;
pub mod error;
pub mod explorer;
pub mod handlers;
pub mod rpc;
pub mod transactions;
pub mod units;

pub use error::ChainError;
pub use explorer::{ExplorerApi, HttpExplorerClient};
pub use handlers::{
    BlockchainHandler, ChainOperation, ChainToolkit, blockchain_operations,
    register_blockchain_handlers,
};
pub use rpc::{ChainRpc, HttpRpcClient};
pub use transactions::{TransactionBuilder, UnsignedTransaction};

use crate::config::{ConfigError, FileChainConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Chain parameters the handlers need at call time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    pub chain_id: u64,
    pub native_symbol: String,
    pub wrapped_native_address: Option<String>,
    pub dex_router_address: Option<String>,
    pub swap_deadline_secs: u64,
    /// Passphrase for `personal_newAccount`
    pub wallet_passphrase: String,
}

impl ChainSettings {
    pub fn from_config(config: &FileChainConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            native_symbol: config.native_symbol.clone(),
            wrapped_native_address: config.wrapped_native_address.clone(),
            dex_router_address: config.dex_router_address.clone(),
            swap_deadline_secs: config.swap_deadline_secs,
            wallet_passphrase: config.resolve_wallet_passphrase(),
        }
    }
}

impl ChainToolkit {
    /// HTTP-backed toolkit for the configured node and explorer.
    pub fn from_config(config: &FileChainConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let rpc = HttpRpcClient::new(client.clone(), &config.rpc_url);
        let explorer = HttpExplorerClient::new(client, &config.explorer_url)
            .with_api_key(config.resolve_explorer_api_key());

        Ok(Self::new(
            Arc::new(rpc),
            Arc::new(explorer),
            ChainSettings::from_config(config),
        ))
    }
}
