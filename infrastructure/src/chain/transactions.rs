//! Unsigned transaction requests for the caller's wallet to sign.

use super::abi;
use super::units::to_hex_quantity;
use serde::Serialize;

/// An `eth_sendTransaction`-shaped request without nonce, gas or signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    /// Native value in wei, hex quantity
    pub value: String,
    /// ABI-encoded calldata, `0x` for plain transfers
    pub data: String,
}

/// Builds transactions for one chain, optionally from a known sender.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    chain_id: u64,
    from: Option<String>,
}

impl TransactionBuilder {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            from: None,
        }
    }

    pub fn with_from(mut self, from: Option<String>) -> Self {
        self.from = from;
        self
    }

    fn build(&self, to: &str, value: u128, data: String) -> UnsignedTransaction {
        UnsignedTransaction {
            chain_id: self.chain_id,
            from: self.from.clone(),
            to: to.to_string(),
            value: to_hex_quantity(value),
            data,
        }
    }

    pub fn native_transfer(&self, to: &str, wei: u128) -> UnsignedTransaction {
        self.build(to, wei, "0x".to_string())
    }

    pub fn token_transfer(&self, token: &str, to: &str, amount: u128) -> UnsignedTransaction {
        self.build(token, 0, abi::transfer_calldata(to, amount))
    }

    /// Wrap native value by calling `deposit()` on the wrapped-token contract.
    pub fn wrap(&self, wrapped_token: &str, wei: u128) -> UnsignedTransaction {
        self.build(wrapped_token, wei, abi::deposit_calldata())
    }

    pub fn approve(&self, token: &str, spender: &str, amount: u128) -> UnsignedTransaction {
        self.build(token, 0, abi::approve_calldata(spender, amount))
    }

    pub fn swap_exact_tokens(
        &self,
        router: &str,
        amount_in: u128,
        path: &[&str],
        recipient: &str,
        deadline: u64,
    ) -> UnsignedTransaction {
        self.build(
            router,
            0,
            abi::swap_exact_tokens_calldata(amount_in, 0, path, recipient, deadline),
        )
    }
}
