//! Chain configuration from TOML (`[chain]` section)

use serde::{Deserialize, Serialize};

/// Raw chain configuration from TOML
///
/// # Example
///
/// ```toml
/// [chain]
/// rpc_url = "https://evm-t3.cronos.org"
/// chain_id = 338
/// native_symbol = "TCRO"
/// explorer_url = "https://api-testnet.cronoscan.com/api"
/// explorer_api_key_env = "EXPLORER_API_KEY"
/// wrapped_native_address = "0x..."
/// dex_router_address = "0x..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChainConfig {
    /// EVM JSON-RPC endpoint
    pub rpc_url: String,
    pub chain_id: u64,
    /// Symbol of the native token, used in balance reports
    pub native_symbol: String,
    /// Etherscan-compatible explorer API
    pub explorer_url: String,
    pub explorer_api_key_env: String,
    /// Wrapped native token contract; `wrapToken` needs it
    pub wrapped_native_address: Option<String>,
    /// Uniswap-V2-style router; `swapToken` needs it
    pub dex_router_address: Option<String>,
    /// Seconds from now until a built swap expires
    pub swap_deadline_secs: u64,
    /// Env var holding the passphrase for node-created wallets
    pub wallet_passphrase_env: String,
    pub request_timeout_secs: u64,
}

impl Default for FileChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://evm-t3.cronos.org".to_string(),
            chain_id: 338,
            native_symbol: "TCRO".to_string(),
            explorer_url: "https://api-testnet.cronoscan.com/api".to_string(),
            explorer_api_key_env: "EXPLORER_API_KEY".to_string(),
            wrapped_native_address: None,
            dex_router_address: None,
            swap_deadline_secs: 1200,
            wallet_passphrase_env: "CHAIN_AGENT_WALLET_PASSPHRASE".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl FileChainConfig {
    pub fn resolve_explorer_api_key(&self) -> Option<String> {
        std::env::var(&self.explorer_api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// Passphrase for `personal_newAccount`; empty when the env var is unset.
    pub fn resolve_wallet_passphrase(&self) -> String {
        std::env::var(&self.wallet_passphrase_env).unwrap_or_default()
    }
}
