//! Execution result envelope

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Outcome of a single capability execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Uniform envelope around whatever a capability returned.
///
/// Serializes as `{"status": "Success" | "Failed", "data": {...}}`; a failed
/// result always carries `data.message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub data: Value,
}

impl ExecutionResult {
    pub fn success(data: Value) -> Self {
        Self {
            status: ExecutionStatus::Success,
            data,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            data: json!({ "message": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == ExecutionStatus::Failed
    }

    /// The `data.message` field, if present.
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_wire_shape() {
        let result = ExecutionResult::failed("Received unknown function: foo");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": "Failed", "data": {"message": "Received unknown function: foo"}})
        );
        assert_eq!(result.message(), Some("Received unknown function: foo"));
        assert!(result.is_failed());
    }

    #[test]
    fn test_success_keeps_payload() {
        let result = ExecutionResult::success(json!({"balance": "1.5"}));
        assert!(result.is_success());
        assert_eq!(result.data["balance"], "1.5");
        assert_eq!(result.message(), None);
        assert_eq!(serde_json::to_value(&result).unwrap()["status"], "Success");
    }
}
