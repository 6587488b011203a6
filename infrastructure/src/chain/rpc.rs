//! EVM JSON-RPC client.

use super::error::ChainError;
use super::units::parse_hex_quantity;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Global request ID counter for JSON-RPC requests.
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with an auto-generated ID.
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_id(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    /// The result, or the node's error. A missing result is `null`.
    pub fn into_result(self) -> Result<Value, ChainError> {
        if let Some(err) = self.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// Access to an EVM node.
///
/// Only [`call`](ChainRpc::call) is required; the typed helpers decode the
/// common answers on top of it.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError>;

    async fn balance(&self, address: &str) -> Result<u128, ChainError> {
        let value = self.call("eth_getBalance", json!([address, "latest"])).await?;
        quantity(&value, "balance")
    }

    async fn block_by_tag(&self, tag: &str, full_transactions: bool) -> Result<Value, ChainError> {
        self.call("eth_getBlockByNumber", json!([tag, full_transactions]))
            .await
    }

    async fn transaction_by_hash(&self, hash: &str) -> Result<Value, ChainError> {
        self.call("eth_getTransactionByHash", json!([hash])).await
    }

    async fn transaction_receipt(&self, hash: &str) -> Result<Value, ChainError> {
        self.call("eth_getTransactionReceipt", json!([hash])).await
    }

    /// Ask the node's wallet to create an account; returns its address.
    async fn new_account(&self, passphrase: &str) -> Result<String, ChainError> {
        let value = self.call("personal_newAccount", json!([passphrase])).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainError::decode("new account", value))
    }
}

/// Decode a hex quantity held in a JSON value.
pub fn quantity(value: &Value, what: &'static str) -> Result<u128, ChainError> {
    value
        .as_str()
        .ok_or_else(|| ChainError::decode(what, value))
        .and_then(|s| parse_hex_quantity(s).map_err(|_| ChainError::decode(what, s)))
}

/// [`ChainRpc`] over HTTP POST.
pub struct HttpRpcClient {
    client: Client,
    url: String,
}

impl HttpRpcClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChainRpc for HttpRpcClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let request = JsonRpcRequest::new(method, params);
        debug!("→ {} (id={})", request.method, request.id);

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Transport(format!(
                "node returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::decode("JSON-RPC response", e))?;
        debug!("← {} (id={:?})", method, response.id);
        response.into_result()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Node answering from a method → result table and recording calls.
    #[derive(Default)]
    pub(crate) struct MockRpc {
        answers: HashMap<String, Result<Value, ChainError>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockRpc {
        pub(crate) fn with(mut self, method: &str, answer: Result<Value, ChainError>) -> Self {
            self.answers.insert(method.to_string(), answer);
            self
        }

        pub(crate) fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChainRpc for MockRpc {
        async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            self.answers
                .get(method)
                .cloned()
                .unwrap_or_else(|| Err(ChainError::Transport(format!("unexpected {}", method))))
        }
    }

    #[test]
    fn test_request_ids_increase() {
        let a = JsonRpcRequest::new("eth_blockNumber", json!([]));
        let b = JsonRpcRequest::new("eth_blockNumber", json!([]));
        assert!(b.id > a.id);
        let body = serde_json::to_value(&a).unwrap();
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["params"], json!([]));
    }

    #[test]
    fn test_response_error_maps_to_rpc() {
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": 1,
            "error": {"code": -32601, "message": "the method personal_newAccount does not exist"}
        }))
        .unwrap();
        assert!(matches!(
            response.into_result(),
            Err(ChainError::Rpc { code: -32601, .. })
        ));
    }

    #[test]
    fn test_null_result() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert_eq!(response.into_result().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let rpc = MockRpc::default()
            .with("eth_getBalance", Ok(json!("0xde0b6b3a7640000")))
            .with("eth_getBlockByNumber", Ok(json!({"number": "0x10"})));

        assert_eq!(rpc.balance("0xabc").await.unwrap(), 1_000_000_000_000_000_000);
        let block = rpc.block_by_tag("0x10", true).await.unwrap();
        assert_eq!(quantity(&block["number"], "number").unwrap(), 16);
        assert_eq!(rpc.calls()[0].1, json!(["0xabc", "latest"]));
        assert_eq!(rpc.calls()[1].1, json!(["0x10", true]));
    }
}
