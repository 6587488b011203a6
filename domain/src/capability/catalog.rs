//! Blockchain capability catalogue
//!
//! The default set of capabilities exposed to the model. Names are the
//! exact strings the model sees and proposes.

use super::entities::{CapabilityParameter, CapabilityRegistry, CapabilitySpec, ParameterType};
use crate::core::error::DomainError;

pub const TRANSFER_TOKEN: &str = "transferToken";
pub const GET_BALANCE: &str = "getBalance";
pub const GET_LATEST_BLOCK: &str = "getLatestBlock";
pub const GET_TRANSACTIONS_BY_ADDRESS: &str = "getTransactionsByAddress";
pub const GET_CONTRACT_ABI: &str = "getContractABI";
pub const GET_TRANSACTION_BY_HASH: &str = "getTransactionByHash";
pub const GET_BLOCK_BY_TAG: &str = "getBlockByTag";
pub const GET_TRANSACTION_STATUS: &str = "getTransactionStatus";
pub const CREATE_WALLET: &str = "createWallet";
pub const WRAP_TOKEN: &str = "wrapToken";
pub const SWAP_TOKEN: &str = "swapToken";
pub const GET_CURRENT_TIME: &str = "getCurrentTime";

/// Symbols accepted by `transferToken`.
pub const TRANSFER_SYMBOLS: [&str; 2] = ["TCRO", "ETH"];

/// Default page size of `getTransactionsByAddress`.
pub const DEFAULT_TX_PAGE_SIZE: u64 = 20;
pub const MAX_TX_PAGE_SIZE: u64 = 100;

/// Every capability of the blockchain agent, in the order shown to the model.
pub fn blockchain_capabilities() -> Vec<CapabilitySpec> {
    vec![
        CapabilitySpec::new(TRANSFER_TOKEN, "Transfer a token from the current wallet")
            .with_parameter(CapabilityParameter::new(
                "to",
                "Recipient's wallet address",
                true,
            ))
            .with_parameter(
                CapabilityParameter::new("amount", "Amount to be sent", true)
                    .with_type(ParameterType::Number),
            )
            .with_parameter(CapabilityParameter::new(
                "contractAddress",
                "ERC-20 contract address; omit to send the native token",
                false,
            ))
            .with_parameter(
                CapabilityParameter::new(
                    "symbol",
                    "Type of token to send (e.g., TCRO, ETH)",
                    false,
                )
                .with_enum(TRANSFER_SYMBOLS),
            ),
        CapabilitySpec::new(GET_BALANCE, "Get the current balance of a wallet address")
            .with_parameter(CapabilityParameter::new(
                "address",
                "Wallet address to get balance for",
                true,
            )),
        CapabilitySpec::new(GET_LATEST_BLOCK, "Get the latest block"),
        CapabilitySpec::new(
            GET_TRANSACTIONS_BY_ADDRESS,
            "Get the list of transactions for an address",
        )
        .with_parameter(CapabilityParameter::new(
            "address",
            "Address to get transactions for",
            true,
        ))
        .with_parameter(CapabilityParameter::new(
            "session",
            "Previous page session. Leave empty for first page",
            false,
        ))
        .with_parameter(
            CapabilityParameter::new("limit", "Page size (max 100)", false)
                .with_type(ParameterType::Number)
                .with_bounds(1.0, MAX_TX_PAGE_SIZE as f64)
                .with_default(DEFAULT_TX_PAGE_SIZE),
        ),
        CapabilitySpec::new(GET_CONTRACT_ABI, "Get the ABI of a verified smart contract")
            .with_parameter(CapabilityParameter::new(
                "address",
                "Contract address to get ABI for",
                true,
            )),
        CapabilitySpec::new(
            GET_TRANSACTION_BY_HASH,
            "Get the details of a transaction by its hash",
        )
        .with_parameter(CapabilityParameter::new(
            "txHash",
            "Transaction hash to get details for",
            true,
        )),
        CapabilitySpec::new(
            GET_BLOCK_BY_TAG,
            "Get information about a block by its number or tag (e.g. \"latest\", \"earliest\", \"pending\")",
        )
        .with_parameter(CapabilityParameter::new(
            "blockTag",
            "Block number in integer, or \"earliest\", \"latest\", or \"pending\"",
            true,
        ))
        .with_parameter(
            CapabilityParameter::new(
                "txDetail",
                "If true, returns full transaction objects; if false, only transaction hashes",
                false,
            )
            .with_type(ParameterType::Boolean)
            .with_default(false),
        ),
        CapabilitySpec::new(
            GET_TRANSACTION_STATUS,
            "Get the status of a transaction by its hash",
        )
        .with_parameter(CapabilityParameter::new(
            "txHash",
            "Transaction hash to get status for",
            true,
        )),
        CapabilitySpec::new(CREATE_WALLET, "Create a new wallet"),
        CapabilitySpec::new(WRAP_TOKEN, "Wrap the native token into its wrapped ERC-20")
            .with_parameter(
                CapabilityParameter::new("amount", "Amount of token to be wrapped", true)
                    .with_type(ParameterType::Number),
            ),
        CapabilitySpec::new(SWAP_TOKEN, "Swap one token for another on the DEX router")
            .with_parameter(CapabilityParameter::new(
                "fromContractAddress",
                "Contract address of the token to sell",
                true,
            ))
            .with_parameter(CapabilityParameter::new(
                "toContractAddress",
                "Contract address of the token to buy",
                true,
            ))
            .with_parameter(
                CapabilityParameter::new("amount", "Amount of token to be swapped", true)
                    .with_type(ParameterType::Number),
            ),
        CapabilitySpec::new(GET_CURRENT_TIME, "Get the current local and UTC time"),
    ]
}

/// Registry holding [`blockchain_capabilities`].
pub fn blockchain_registry() -> Result<CapabilityRegistry, DomainError> {
    blockchain_capabilities()
        .into_iter()
        .fold(CapabilityRegistry::builder(), |builder, spec| {
            builder.register(spec)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_builds_in_order() {
        let registry = blockchain_registry().unwrap();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.list()[0].name, TRANSFER_TOKEN);
        assert_eq!(registry.list()[11].name, GET_CURRENT_TIME);
    }

    #[test]
    fn test_required_fields() {
        let registry = blockchain_registry().unwrap();
        let required = |name: &str| -> Vec<String> {
            registry
                .get(name)
                .unwrap()
                .required_parameters()
                .map(str::to_string)
                .collect()
        };
        assert_eq!(required(TRANSFER_TOKEN), vec!["to", "amount"]);
        assert_eq!(required(GET_BLOCK_BY_TAG), vec!["blockTag"]);
        assert_eq!(
            required(SWAP_TOKEN),
            vec!["fromContractAddress", "toContractAddress", "amount"]
        );
        assert!(required(CREATE_WALLET).is_empty());
        assert!(required(GET_LATEST_BLOCK).is_empty());
    }

    #[test]
    fn test_transactions_limit_schema() {
        let registry = blockchain_registry().unwrap();
        let schema = registry
            .get(GET_TRANSACTIONS_BY_ADDRESS)
            .unwrap()
            .parameters_schema();
        let limit = &schema["properties"]["limit"];
        assert_eq!(limit["minimum"], 1.0);
        assert_eq!(limit["maximum"], 100.0);
        assert_eq!(limit["default"], 20);
    }

    #[test]
    fn test_transfer_symbol_enum() {
        let registry = blockchain_registry().unwrap();
        let symbol = registry
            .get(TRANSFER_TOKEN)
            .unwrap()
            .parameter("symbol")
            .unwrap();
        assert_eq!(
            symbol.enum_values.as_deref(),
            Some(&["TCRO".to_string(), "ETH".to_string()][..])
        );
    }
}
