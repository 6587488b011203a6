//! Shared request/response plumbing for the HTTP model backends

use chain_agent_application::BackendError;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Send a prepared request and decode the JSON body.
///
/// Non-2xx answers are classified with [`BackendError::from_status`] so that
/// auth and model errors keep their kind across providers.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, BackendError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        debug!("{} returned HTTP {}: {}", provider, status.as_u16(), body);
        return Err(BackendError::from_status(
            status.as_u16(),
            extract_error_message(&body),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        BackendError::InvalidResponse(format!("{} response could not be decoded: {}", provider, e))
    })
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Transport(err.to_string())
    }
}

/// Pull `error.message` out of an OpenAI/Google style error body, keeping the
/// raw body when there is none.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_openai_error_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided: sk-abc","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let message = extract_error_message(body);
        assert_eq!(message, "Incorrect API key provided: sk-abc");
        assert!(BackendError::from_status(400, message).is_authentication());
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        assert_eq!(extract_error_message("upstream down"), "upstream down");
    }
}
