//! Etherscan-compatible explorer API client.

use super::error::ChainError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Explorer answers that mean "nothing here" rather than failure.
const EMPTY_RESULT_MESSAGES: [&str; 2] = ["No transactions found", "No records found"];

/// Standard `{status, message, result}` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

impl ExplorerEnvelope {
    pub fn into_result(self) -> Result<Value, ChainError> {
        if self.status == "1" {
            return Ok(self.result);
        }
        if EMPTY_RESULT_MESSAGES
            .iter()
            .any(|m| self.message.eq_ignore_ascii_case(m))
        {
            return Ok(Value::Array(Vec::new()));
        }
        let detail = match self.result {
            Value::String(s) if !s.is_empty() => s,
            _ => self.message,
        };
        Err(ChainError::Explorer(detail))
    }
}

#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Run `module`/`action` with extra query parameters.
    async fn query(
        &self,
        module: &str,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ChainError>;

    async fn transactions(
        &self,
        address: &str,
        page: u64,
        offset: u64,
    ) -> Result<Value, ChainError> {
        self.query(
            "account",
            "txlist",
            &[
                ("address", address.to_string()),
                ("page", page.to_string()),
                ("offset", offset.to_string()),
                ("sort", "desc".to_string()),
            ],
        )
        .await
    }

    /// Verified ABI, decoded from the JSON string the explorer returns.
    async fn contract_abi(&self, address: &str) -> Result<Value, ChainError> {
        let result = self
            .query("contract", "getabi", &[("address", address.to_string())])
            .await?;
        match result {
            Value::String(abi) => {
                serde_json::from_str(&abi).map_err(|e| ChainError::decode("contract ABI", e))
            }
            other => Ok(other),
        }
    }
}

/// [`ExplorerApi`] over HTTP GET.
pub struct HttpExplorerClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpExplorerClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

#[async_trait]
impl ExplorerApi for HttpExplorerClient {
    async fn query(
        &self,
        module: &str,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ChainError> {
        let mut query: Vec<(&str, String)> = vec![
            ("module", module.to_string()),
            ("action", action.to_string()),
        ];
        query.extend(params.iter().cloned());
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }

        debug!("explorer {}/{}", module, action);
        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Transport(format!(
                "explorer returned HTTP {}",
                status.as_u16()
            )));
        }

        let envelope: ExplorerEnvelope = response
            .json()
            .await
            .map_err(|e| ChainError::decode("explorer response", e))?;
        envelope.into_result()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Explorer answering per `module/action`.
    #[derive(Default)]
    pub(crate) struct MockExplorer {
        answers: HashMap<String, Result<Value, ChainError>>,
        queries: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl MockExplorer {
        pub(crate) fn with(
            mut self,
            module_action: &str,
            answer: Result<Value, ChainError>,
        ) -> Self {
            self.answers.insert(module_action.to_string(), answer);
            self
        }

        pub(crate) fn queries(&self) -> Vec<Vec<(String, String)>> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExplorerApi for MockExplorer {
        async fn query(
            &self,
            module: &str,
            action: &str,
            params: &[(&str, String)],
        ) -> Result<Value, ChainError> {
            self.queries.lock().unwrap().push(
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            );
            self.answers
                .get(&format!("{}/{}", module, action))
                .cloned()
                .unwrap_or_else(|| Err(ChainError::Transport("unexpected query".into())))
        }
    }

    #[test]
    fn test_envelope_ok() {
        let envelope: ExplorerEnvelope =
            serde_json::from_value(json!({"status": "1", "message": "OK", "result": [1]}))
                .unwrap();
        assert_eq!(envelope.into_result().unwrap(), json!([1]));
    }

    #[test]
    fn test_envelope_no_transactions_is_empty() {
        let envelope: ExplorerEnvelope = serde_json::from_value(
            json!({"status": "0", "message": "No transactions found", "result": []}),
        )
        .unwrap();
        assert_eq!(envelope.into_result().unwrap(), json!([]));
    }

    #[test]
    fn test_envelope_error_uses_result_text() {
        let envelope: ExplorerEnvelope = serde_json::from_value(json!({
            "status": "0", "message": "NOTOK",
            "result": "Contract source code not verified"
        }))
        .unwrap();
        assert_eq!(
            envelope.into_result().unwrap_err(),
            ChainError::Explorer("Contract source code not verified".into())
        );
    }

    #[tokio::test]
    async fn test_contract_abi_decodes_string() {
        let explorer = MockExplorer::default().with(
            "contract/getabi",
            Ok(json!("[{\"type\":\"function\",\"name\":\"totalSupply\"}]")),
        );
        let abi = explorer.contract_abi("0xabc").await.unwrap();
        assert_eq!(abi[0]["name"], "totalSupply");
    }
}
