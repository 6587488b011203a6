//! Capability execution.
//!
//! [`HandlerTable`] is the closed dispatch table name → handler, built once
//! at startup and checked against the registry. [`CapabilityExecutor`]
//! validates each proposed call, dispatches it, and folds every outcome
//! (including handler panics) into an [`ExecutionResult`].

use crate::ports::capability_handler::{CapabilityError, CapabilityHandler, SessionScope};
use crate::ports::turn_observer::TurnObserver;
use chain_agent_domain::{
    ArgumentValidator, CapabilityRegistry, ExecutionResult, ProposedCall, RequiredFieldValidator,
};
use futures::FutureExt;
use futures::future::join_all;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Mismatch between the handler table and the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerTableError {
    #[error("Handler registered twice for capability '{0}'")]
    DuplicateHandler(String),

    #[error("No handler registered for capabilities: {}", .0.join(", "))]
    MissingHandlers(Vec<String>),

    #[error("Handlers registered for unknown capabilities: {}", .0.join(", "))]
    UnknownCapabilities(Vec<String>),
}

/// Closed dispatch table, capability name → handler
pub struct HandlerTable {
    handlers: HashMap<String, Arc<dyn CapabilityHandler>>,
}

impl HandlerTable {
    pub fn builder() -> HandlerTableBuilder {
        HandlerTableBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CapabilityHandler>> {
        self.handlers.get(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[derive(Default)]
pub struct HandlerTableBuilder {
    handlers: Vec<(String, Arc<dyn CapabilityHandler>)>,
}

impl HandlerTableBuilder {
    pub fn register(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn CapabilityHandler>,
    ) -> Self {
        self.handlers.push((name.into(), handler));
        self
    }

    /// Build the table. Every registry entry must have exactly one handler
    /// and every handler must name a registry entry.
    pub fn build(self, registry: &CapabilityRegistry) -> Result<HandlerTable, HandlerTableError> {
        let mut handlers = HashMap::with_capacity(self.handlers.len());
        for (name, handler) in self.handlers {
            if handlers.contains_key(&name) {
                return Err(HandlerTableError::DuplicateHandler(name));
            }
            handlers.insert(name, handler);
        }

        let missing: Vec<String> = registry
            .names()
            .filter(|name| !handlers.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(HandlerTableError::MissingHandlers(missing));
        }

        let mut unknown: Vec<String> = handlers
            .keys()
            .filter(|name| !registry.contains(name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(HandlerTableError::UnknownCapabilities(unknown));
        }

        Ok(HandlerTable { handlers })
    }
}

/// Validates and dispatches proposed calls.
#[derive(Clone)]
pub struct CapabilityExecutor {
    registry: Arc<CapabilityRegistry>,
    handlers: Arc<HandlerTable>,
    validator: Arc<dyn ArgumentValidator>,
}

impl CapabilityExecutor {
    pub fn new(registry: Arc<CapabilityRegistry>, handlers: Arc<HandlerTable>) -> Self {
        Self {
            registry,
            handlers,
            validator: Arc::new(RequiredFieldValidator),
        }
    }

    /// Execute one call. Never fails and never panics: every outcome is an
    /// [`ExecutionResult`].
    pub async fn execute(&self, call: &ProposedCall, scope: &SessionScope) -> ExecutionResult {
        if let Err(e) = self.validator.validate(&self.registry, call) {
            warn!("Rejected call {} ({}): {}", call.call_id, call.capability_name, e);
            return ExecutionResult::failed(e.to_string());
        }

        let Some(handler) = self.handlers.get(&call.capability_name) else {
            return ExecutionResult::failed(format!(
                "Received unknown function: {}",
                call.capability_name
            ));
        };

        debug!("Executing {} ({})", call.capability_name, call.call_id);
        let outcome = AssertUnwindSafe(handler.invoke(call, scope))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(data)) => ExecutionResult::success(data),
            Ok(Err(CapabilityError::Domain(message))) => {
                debug!("{} failed: {}", call.capability_name, message);
                ExecutionResult::failed(format!("Error during execution: {}", message))
            }
            Ok(Err(CapabilityError::Unexpected(message))) => {
                error!("{} failed unexpectedly: {}", call.capability_name, message);
                ExecutionResult::failed(format!("Unknown error during execution: {}", message))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("{} panicked: {}", call.capability_name, message);
                ExecutionResult::failed(format!("Unknown error during execution: {}", message))
            }
        }
    }

    /// Execute all calls concurrently; results come back in proposal order.
    ///
    /// `observer` sees each call start and finish in completion order.
    pub async fn execute_all(
        &self,
        calls: &[ProposedCall],
        scope: &SessionScope,
        observer: &dyn TurnObserver,
    ) -> Vec<ExecutionResult> {
        join_all(calls.iter().map(|call| async move {
            observer.on_call_started(call);
            let result = self.execute(call, scope).await;
            observer.on_call_result(call, &result);
            result
        }))
        .await
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::turn_observer::NoTurnObserver;
    use async_trait::async_trait;
    use chain_agent_domain::{CapabilityParameter, CapabilitySpec, SessionId};
    use serde_json::{Value, json};
    use std::time::Duration;

    /// Handler returning a fixed outcome after an optional delay.
    pub(crate) struct StubHandler {
        pub(crate) delay_ms: u64,
        pub(crate) outcome: Result<Value, CapabilityError>,
    }

    impl StubHandler {
        pub(crate) fn ok(value: Value) -> Arc<Self> {
            Arc::new(Self {
                delay_ms: 0,
                outcome: Ok(value),
            })
        }
    }

    #[async_trait]
    impl CapabilityHandler for StubHandler {
        async fn invoke(
            &self,
            _call: &ProposedCall,
            _scope: &SessionScope,
        ) -> Result<Value, CapabilityError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.outcome.clone()
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl CapabilityHandler for PanickingHandler {
        async fn invoke(
            &self,
            _call: &ProposedCall,
            _scope: &SessionScope,
        ) -> Result<Value, CapabilityError> {
            panic!("stack smashed")
        }
    }

    fn registry() -> Arc<CapabilityRegistry> {
        Arc::new(
            CapabilityRegistry::builder()
                .register(
                    CapabilitySpec::new("slow", "slow")
                        .with_parameter(CapabilityParameter::new("n", "n", false)),
                )
                .register(CapabilitySpec::new("fast", "fast"))
                .register(CapabilitySpec::new("domainFail", "d"))
                .register(CapabilitySpec::new("bug", "b"))
                .register(CapabilitySpec::new("panics", "p"))
                .register(
                    CapabilitySpec::new("transferToken", "t")
                        .with_parameter(CapabilityParameter::new("to", "to", true))
                        .with_parameter(CapabilityParameter::new("amount", "amount", true)),
                )
                .build()
                .unwrap(),
        )
    }

    fn executor() -> CapabilityExecutor {
        let registry = registry();
        let table = HandlerTable::builder()
            .register(
                "slow",
                Arc::new(StubHandler {
                    delay_ms: 50,
                    outcome: Ok(json!({"who": "slow"})),
                }),
            )
            .register("fast", StubHandler::ok(json!({"who": "fast"})))
            .register(
                "domainFail",
                Arc::new(StubHandler {
                    delay_ms: 0,
                    outcome: Err(CapabilityError::domain("Invalid address: 0xZZ")),
                }),
            )
            .register(
                "bug",
                Arc::new(StubHandler {
                    delay_ms: 0,
                    outcome: Err(CapabilityError::unexpected("connection reset")),
                }),
            )
            .register("panics", Arc::new(PanickingHandler))
            .register("transferToken", StubHandler::ok(json!({"sent": true})))
            .build(&registry)
            .unwrap();
        CapabilityExecutor::new(registry, Arc::new(table))
    }

    fn scope() -> SessionScope {
        SessionScope::new(SessionId::new("test").unwrap())
    }

    #[tokio::test]
    async fn test_results_keep_proposal_order() {
        let calls = vec![
            ProposedCall::new("call-1", "slow"),
            ProposedCall::new("call-2", "fast"),
            ProposedCall::new("call-3", "nope"),
        ];
        let results = executor()
            .execute_all(&calls, &scope(), &NoTurnObserver)
            .await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].data["who"], "slow");
        assert_eq!(results[1].data["who"], "fast");
        assert_eq!(
            results[2].message(),
            Some("Received unknown function: nope")
        );
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let call = ProposedCall::new("call-1", "transferToken").with_arg("amount", 1);
        let result = executor().execute(&call, &scope()).await;
        assert!(result.is_failed());
        assert_eq!(
            result.message(),
            Some("Missing required arguments for transferToken: to")
        );
    }

    #[tokio::test]
    async fn test_failure_prefixes() {
        let executor = executor();
        let domain = executor
            .execute(&ProposedCall::new("c1", "domainFail"), &scope())
            .await;
        assert_eq!(
            domain.message(),
            Some("Error during execution: Invalid address: 0xZZ")
        );

        let bug = executor.execute(&ProposedCall::new("c2", "bug"), &scope()).await;
        assert_eq!(
            bug.message(),
            Some("Unknown error during execution: connection reset")
        );
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let result = executor()
            .execute(&ProposedCall::new("c1", "panics"), &scope())
            .await;
        assert!(result.is_failed());
        assert_eq!(
            result.message(),
            Some("Unknown error during execution: stack smashed")
        );
    }

    #[test]
    fn test_table_missing_handler() {
        let err = HandlerTable::builder()
            .register("fast", StubHandler::ok(json!({})))
            .build(&registry())
            .err()
            .unwrap();
        match err {
            HandlerTableError::MissingHandlers(names) => {
                assert!(names.contains(&"slow".to_string()));
                assert!(!names.contains(&"fast".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_table_unknown_and_duplicate() {
        let small = CapabilityRegistry::builder()
            .register(CapabilitySpec::new("fast", "fast"))
            .build()
            .unwrap();

        let unknown = HandlerTable::builder()
            .register("fast", StubHandler::ok(json!({})))
            .register("ghost", StubHandler::ok(json!({})))
            .build(&small)
            .err()
            .unwrap();
        assert_eq!(
            unknown,
            HandlerTableError::UnknownCapabilities(vec!["ghost".to_string()])
        );

        let duplicate = HandlerTable::builder()
            .register("fast", StubHandler::ok(json!({})))
            .register("fast", StubHandler::ok(json!({})))
            .build(&small)
            .err()
            .unwrap();
        assert_eq!(
            duplicate,
            HandlerTableError::DuplicateHandler("fast".to_string())
        );
    }
}
