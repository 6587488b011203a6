//! Handlers behind the blockchain capability catalogue.

use super::ChainSettings;
use super::error::ChainError;
use super::explorer::ExplorerApi;
use super::rpc::{ChainRpc, quantity};
use super::transactions::TransactionBuilder;
use super::units::{
    DEFAULT_DECIMALS, format_units, normalize_block_tag, parse_units, validate_address,
    validate_tx_hash,
};
use async_trait::async_trait;
use chain_agent_application::{
    CapabilityError, CapabilityHandler, HandlerTableBuilder, SessionScope,
};
use chain_agent_domain::ProposedCall;
use chain_agent_domain::capability::catalog::{
    CREATE_WALLET, DEFAULT_TX_PAGE_SIZE, GET_BALANCE, GET_BLOCK_BY_TAG, GET_CONTRACT_ABI,
    GET_CURRENT_TIME, GET_LATEST_BLOCK, GET_TRANSACTION_BY_HASH, GET_TRANSACTION_STATUS,
    GET_TRANSACTIONS_BY_ADDRESS, MAX_TX_PAGE_SIZE, SWAP_TOKEN, TRANSFER_TOKEN, WRAP_TOKEN,
};
use chrono::{Local, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

type ChainResult = Result<Value, ChainError>;

/// One blockchain capability, bound to the toolkit method that serves it.
pub type ChainOperation = for<'a> fn(
    &'a ChainToolkit,
    &'a ProposedCall,
    &'a SessionScope,
) -> BoxFuture<'a, ChainResult>;

/// The blockchain catalogue as a name → operation table.
pub fn blockchain_operations() -> [(&'static str, ChainOperation); 12] {
    [
        (TRANSFER_TOKEN, |toolkit, call, scope| {
            ready(toolkit.transfer_token(call, scope)).boxed()
        }),
        (GET_BALANCE, |toolkit, call, _| toolkit.get_balance(call).boxed()),
        (GET_LATEST_BLOCK, |toolkit, _, _| toolkit.get_latest_block().boxed()),
        (GET_TRANSACTIONS_BY_ADDRESS, |toolkit, call, _| {
            toolkit.get_transactions_by_address(call).boxed()
        }),
        (GET_CONTRACT_ABI, |toolkit, call, _| {
            toolkit.get_contract_abi(call).boxed()
        }),
        (GET_TRANSACTION_BY_HASH, |toolkit, call, _| {
            toolkit.get_transaction_by_hash(call).boxed()
        }),
        (GET_BLOCK_BY_TAG, |toolkit, call, _| {
            toolkit.get_block_by_tag(call).boxed()
        }),
        (GET_TRANSACTION_STATUS, |toolkit, call, _| {
            toolkit.get_transaction_status(call).boxed()
        }),
        (CREATE_WALLET, |toolkit, _, scope| toolkit.create_wallet(scope).boxed()),
        (WRAP_TOKEN, |toolkit, call, scope| {
            ready(toolkit.wrap_token(call, scope)).boxed()
        }),
        (SWAP_TOKEN, |toolkit, call, scope| {
            ready(toolkit.swap_token(call, scope)).boxed()
        }),
        (GET_CURRENT_TIME, |_, _, _| {
            ready(Ok(ChainToolkit::get_current_time())).boxed()
        }),
    ]
}

fn required_str<'a>(call: &'a ProposedCall, key: &str) -> Result<&'a str, ChainError> {
    call.require_str(key).map_err(ChainError::InvalidInput)
}

fn required_address<'a>(call: &'a ProposedCall, key: &str) -> Result<&'a str, ChainError> {
    validate_address(required_str(call, key)?)
}

/// Positive decimal amount in 18-decimal base units, plus its text.
fn required_amount(call: &ProposedCall) -> Result<(String, u128), ChainError> {
    let text = call
        .get_decimal_text("amount")
        .ok_or_else(|| ChainError::invalid("Invalid amount: expected a number"))?;
    let units = parse_units(&text, DEFAULT_DECIMALS)?;
    if units == 0 {
        return Err(ChainError::invalid("Amount must be greater than zero"));
    }
    Ok((text, units))
}

fn decimal_field(value: &Value, key: &str) -> Value {
    value
        .get(key)
        .and_then(|v| quantity(v, "quantity").ok())
        .map(|n| json!(n.to_string()))
        .unwrap_or(Value::Null)
}

/// Chain access shared by every blockchain handler.
pub struct ChainToolkit {
    rpc: Arc<dyn ChainRpc>,
    explorer: Arc<dyn ExplorerApi>,
    settings: ChainSettings,
}

impl ChainToolkit {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        explorer: Arc<dyn ExplorerApi>,
        settings: ChainSettings,
    ) -> Self {
        Self {
            rpc,
            explorer,
            settings,
        }
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    fn tx_builder(&self, scope: &SessionScope) -> TransactionBuilder {
        TransactionBuilder::new(self.settings.chain_id)
            .with_from(scope.active_wallet().map(|w| w.address))
    }

    fn transfer_token(
        &self,
        call: &ProposedCall,
        scope: &SessionScope,
    ) -> Result<Value, ChainError> {
        let to = required_address(call, "to")?;
        let (amount, units) = required_amount(call)?;
        let contract = call
            .get_str("contractAddress")
            .filter(|s| !s.trim().is_empty())
            .map(validate_address)
            .transpose()?;

        let builder = self.tx_builder(scope);
        let (transaction, token) = match contract {
            Some(contract) => (
                builder.token_transfer(contract, to, units),
                contract.to_string(),
            ),
            None => (
                builder.native_transfer(to, units),
                call.get_str("symbol")
                    .unwrap_or(&self.settings.native_symbol)
                    .to_string(),
            ),
        };

        Ok(json!({
            "transaction": transaction,
            "to": to,
            "amount": amount,
            "token": token,
            "message": format!(
                "Prepared transfer of {} {} to {}. Sign and broadcast it with your wallet.",
                amount, token, to
            ),
        }))
    }

    async fn get_balance(&self, call: &ProposedCall) -> Result<Value, ChainError> {
        let address = required_address(call, "address")?;
        let wei = self.rpc.balance(address).await?;
        Ok(json!({
            "address": address,
            "balance": format_units(wei, DEFAULT_DECIMALS),
            "balanceWei": wei.to_string(),
            "symbol": self.settings.native_symbol,
        }))
    }

    async fn get_latest_block(&self) -> Result<Value, ChainError> {
        self.fetch_block("latest", false).await
    }

    async fn get_transactions_by_address(&self, call: &ProposedCall) -> Result<Value, ChainError> {
        let address = required_address(call, "address")?;
        let limit = call
            .get_u64("limit")
            .unwrap_or(DEFAULT_TX_PAGE_SIZE)
            .clamp(1, MAX_TX_PAGE_SIZE);
        let page = match call.get_str("session").filter(|s| !s.trim().is_empty()) {
            Some(cursor) => cursor
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| ChainError::invalid(format!("Invalid session cursor: {}", cursor)))?,
            None => 1,
        };

        let result = self.explorer.transactions(address, page, limit).await?;
        let transactions: Vec<Value> = result
            .as_array()
            .map(|txs| {
                txs.iter()
                    .map(|tx| {
                        let value = tx
                            .get("value")
                            .and_then(Value::as_str)
                            .and_then(|v| v.parse::<u128>().ok())
                            .map(|wei| format_units(wei, DEFAULT_DECIMALS));
                        json!({
                            "hash": tx.get("hash"),
                            "from": tx.get("from"),
                            "to": tx.get("to"),
                            "value": value,
                            "blockNumber": tx.get("blockNumber"),
                            "timeStamp": tx.get("timeStamp"),
                            "isError": tx.get("isError"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let next_session = (transactions.len() as u64 == limit).then(|| (page + 1).to_string());
        Ok(json!({
            "address": address,
            "transactions": transactions,
            "nextSession": next_session,
        }))
    }

    async fn get_contract_abi(&self, call: &ProposedCall) -> Result<Value, ChainError> {
        let address = required_address(call, "address")?;
        let abi = self.explorer.contract_abi(address).await?;
        Ok(json!({ "address": address, "abi": abi }))
    }

    async fn get_transaction_by_hash(&self, call: &ProposedCall) -> Result<Value, ChainError> {
        let hash = validate_tx_hash(required_str(call, "txHash")?)?;
        let tx = self.rpc.transaction_by_hash(hash).await?;
        if tx.is_null() {
            return Err(ChainError::NotFound(format!("Transaction not found: {}", hash)));
        }
        let value = tx
            .get("value")
            .and_then(|v| quantity(v, "value").ok())
            .map(|wei| format_units(wei, DEFAULT_DECIMALS));
        Ok(json!({
            "hash": hash,
            "from": tx.get("from"),
            "to": tx.get("to"),
            "value": value,
            "blockNumber": decimal_field(&tx, "blockNumber"),
            "nonce": decimal_field(&tx, "nonce"),
            "gas": decimal_field(&tx, "gas"),
            "input": tx.get("input"),
        }))
    }

    async fn get_block_by_tag(&self, call: &ProposedCall) -> Result<Value, ChainError> {
        let tag = required_str(call, "blockTag")?;
        let full = call.get_bool("txDetail").unwrap_or(false);
        self.fetch_block(tag, full).await
    }

    async fn fetch_block(&self, raw_tag: &str, full: bool) -> Result<Value, ChainError> {
        let tag = normalize_block_tag(raw_tag)?;
        let block = self.rpc.block_by_tag(&tag, full).await?;
        if block.is_null() {
            return Err(ChainError::NotFound(format!("Block not found: {}", raw_tag)));
        }
        let transactions = block.get("transactions").cloned().unwrap_or(json!([]));
        Ok(json!({
            "number": decimal_field(&block, "number"),
            "hash": block.get("hash"),
            "parentHash": block.get("parentHash"),
            "timestamp": decimal_field(&block, "timestamp"),
            "gasUsed": decimal_field(&block, "gasUsed"),
            "transactionCount": transactions.as_array().map_or(0, Vec::len),
            "transactions": transactions,
        }))
    }

    async fn get_transaction_status(&self, call: &ProposedCall) -> Result<Value, ChainError> {
        let hash = validate_tx_hash(required_str(call, "txHash")?)?;
        let receipt = self.rpc.transaction_receipt(hash).await?;

        if receipt.is_null() {
            let tx = self.rpc.transaction_by_hash(hash).await?;
            if tx.is_null() {
                return Err(ChainError::NotFound(format!("Transaction not found: {}", hash)));
            }
            return Ok(json!({ "txHash": hash, "status": "pending" }));
        }

        let status = match receipt.get("status").and_then(Value::as_str) {
            Some("0x1") => "success",
            Some("0x0") => "failed",
            _ => "unknown",
        };
        Ok(json!({
            "txHash": hash,
            "status": status,
            "blockNumber": decimal_field(&receipt, "blockNumber"),
            "gasUsed": decimal_field(&receipt, "gasUsed"),
        }))
    }

    async fn create_wallet(&self, scope: &SessionScope) -> Result<Value, ChainError> {
        let address = self
            .rpc
            .new_account(&self.settings.wallet_passphrase)
            .await?;
        let address = validate_address(&address)
            .map_err(|_| ChainError::decode("new account", &address))?
            .to_string();

        scope.record_wallet(address.clone(), "node");
        info!("Session {} created wallet {}", scope.session_id(), address);

        Ok(json!({
            "address": address,
            "message": format!(
                "Created wallet {}. Its key is held by the node; it signs for this session.",
                address
            ),
        }))
    }

    fn wrap_token(&self, call: &ProposedCall, scope: &SessionScope) -> Result<Value, ChainError> {
        let wrapped = self
            .settings
            .wrapped_native_address
            .as_deref()
            .ok_or(ChainError::NotConfigured("chain.wrapped_native_address"))?;
        let (amount, units) = required_amount(call)?;

        let transaction = self.tx_builder(scope).wrap(wrapped, units);
        Ok(json!({
            "transaction": transaction,
            "amount": amount,
            "message": format!(
                "Prepared wrap of {} {}. Sign and broadcast it with your wallet.",
                amount, self.settings.native_symbol
            ),
        }))
    }

    fn swap_token(&self, call: &ProposedCall, scope: &SessionScope) -> Result<Value, ChainError> {
        let router = self
            .settings
            .dex_router_address
            .as_deref()
            .ok_or(ChainError::NotConfigured("chain.dex_router_address"))?;
        let from_token = required_address(call, "fromContractAddress")?;
        let to_token = required_address(call, "toContractAddress")?;
        let (amount, units) = required_amount(call)?;
        let recipient = scope.active_wallet().map(|w| w.address).ok_or_else(|| {
            ChainError::invalid("No wallet in this session; create one with createWallet first")
        })?;

        let deadline = u64::try_from(Utc::now().timestamp())
            .unwrap_or_default()
            .saturating_add(self.settings.swap_deadline_secs);
        let builder = self.tx_builder(scope);
        let approve = builder.approve(from_token, router, units);
        let swap =
            builder.swap_exact_tokens(router, units, &[from_token, to_token], &recipient, deadline);
        debug!("Swap deadline {}", deadline);

        Ok(json!({
            "transactions": [approve, swap],
            "amount": amount,
            "deadline": deadline,
            "message": format!(
                "Prepared approval and swap of {} from {} to {}. Sign and broadcast both in order.",
                amount, from_token, to_token
            ),
        }))
    }

    fn get_current_time() -> Value {
        let now = Utc::now();
        json!({
            "local": Local::now().to_rfc3339(),
            "utc": now.to_rfc3339(),
            "unixTimestamp": now.timestamp(),
        })
    }
}

/// [`CapabilityHandler`] running one [`ChainOperation`] on a shared toolkit.
pub struct BlockchainHandler {
    toolkit: Arc<ChainToolkit>,
    operation: ChainOperation,
}

impl BlockchainHandler {
    pub fn new(toolkit: Arc<ChainToolkit>, operation: ChainOperation) -> Self {
        Self { toolkit, operation }
    }
}

#[async_trait]
impl CapabilityHandler for BlockchainHandler {
    async fn invoke(
        &self,
        call: &ProposedCall,
        scope: &SessionScope,
    ) -> Result<Value, CapabilityError> {
        (self.operation)(&self.toolkit, call, scope)
            .await
            .map_err(CapabilityError::from)
    }
}

/// Register a handler for every blockchain capability.
pub fn register_blockchain_handlers(
    builder: HandlerTableBuilder,
    toolkit: Arc<ChainToolkit>,
) -> HandlerTableBuilder {
    blockchain_operations()
        .into_iter()
        .fold(builder, |builder, (name, operation)| {
            builder.register(
                name,
                Arc::new(BlockchainHandler::new(Arc::clone(&toolkit), operation)),
            )
        })
}
