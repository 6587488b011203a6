//! Run Turn use case.
//!
//! Drives one query through the turn state machine:
//!
//! ```text
//! AwaitingInterpretation ──interpret──► HasCalls ──execute──► Finalizing ──► Done
//!                          │                                     ▲
//!                          └──────────► NoCalls ──(finalize)─────┘
//!                                          └──(short-circuit)──────────────► Done
//! ```
//!
//! Only interpretation errors leave the turn. Execution failures become
//! `Failed` results and finalization failures fall back to
//! [`FALLBACK_RESPONSE`].

use super::execute_capability::CapabilityExecutor;
use super::model_adapter::{InterpretError, ModelAdapter};
use crate::ports::capability_handler::SessionScope;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::turn_observer::TurnObserver;
use chain_agent_domain::util::preview;
use chain_agent_domain::{
    AgentResponse, ConversationContext, ExecutionResult, FALLBACK_RESPONSE, NoCallPolicy,
    ProposedCall, TurnOutcome, TurnPhase,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can end a turn
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error(transparent)]
    Interpret(#[from] InterpretError),

    #[error("Session '{0}' already has a turn in flight")]
    SessionBusy(String),

    #[error("Turn timed out after {0:?}")]
    Timeout(Duration),
}

impl TurnError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, TurnError::Interpret(InterpretError::Authentication(_)))
    }

    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            TurnError::Interpret(InterpretError::ModelUnavailable(_))
        )
    }
}

/// Input for the [`RunTurnUseCase`].
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    pub query: String,
    /// Context as it was before this turn.
    pub context: ConversationContext,
    pub no_call_policy: NoCallPolicy,
}

impl RunTurnInput {
    pub fn new(query: impl Into<String>, context: ConversationContext) -> Self {
        Self {
            query: query.into(),
            context,
            no_call_policy: NoCallPolicy::default(),
        }
    }

    pub fn with_no_call_policy(mut self, policy: NoCallPolicy) -> Self {
        self.no_call_policy = policy;
        self
    }
}

/// Use case for running one interpret → execute → finalize turn.
///
/// Does not touch the context; the caller records the finished turn.
#[derive(Clone)]
pub struct RunTurnUseCase {
    adapter: ModelAdapter,
    executor: CapabilityExecutor,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RunTurnUseCase {
    pub fn new(adapter: ModelAdapter, executor: CapabilityExecutor) -> Self {
        Self {
            adapter,
            executor,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub async fn execute(
        &self,
        input: RunTurnInput,
        scope: &SessionScope,
        observer: &dyn TurnObserver,
    ) -> Result<TurnOutcome, TurnError> {
        info!(
            "Starting turn for session {}: {}",
            scope.session_id(),
            preview(&input.query, 100)
        );
        let mut phase = TurnPhase::AwaitingInterpretation;
        observer.on_phase(phase);

        let response = match self.adapter.interpret(&input.query, &input.context).await {
            Ok(response) => response,
            Err(err) => {
                advance(&mut phase, TurnPhase::Errored, observer);
                self.conversation_logger.log(ConversationEvent::new(
                    "turn_error",
                    json!({
                        "session": scope.session_id().as_str(),
                        "query": input.query,
                        "error": err.to_string(),
                    }),
                ));
                return Err(err.into());
            }
        };
        self.log_interpretation(scope, &input.query, &response);

        if !response.has_calls() {
            advance(&mut phase, TurnPhase::NoCalls, observer);
            if input.no_call_policy == NoCallPolicy::ShortCircuit {
                let text = response.text().map(str::trim).unwrap_or_default();
                let answer = if text.is_empty() {
                    FALLBACK_RESPONSE
                } else {
                    text
                };
                debug!("No calls proposed, short-circuiting");
                self.log_final_response(scope, answer, false);
                advance(&mut phase, TurnPhase::Done, observer);
                return Ok(TurnOutcome::short_circuit(answer));
            }
        } else {
            advance(&mut phase, TurnPhase::HasCalls, observer);
        }

        let calls = response.into_calls();
        let results = self.execute_calls(&calls, scope, observer).await;

        advance(&mut phase, TurnPhase::Finalizing, observer);
        let final_response = match self
            .adapter
            .generate_final_response(&input.query, &results, &input.context)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                warn!("Finalization failed, using fallback: {}", err);
                FALLBACK_RESPONSE.to_string()
            }
        };

        let outcome = TurnOutcome::new(final_response, calls, results);
        self.log_final_response(scope, &outcome.final_response, outcome.has_errors);
        info!(
            "Turn done: {} call(s), errors: {}",
            outcome.execution_results.len(),
            outcome.has_errors
        );
        advance(&mut phase, TurnPhase::Done, observer);
        Ok(outcome)
    }

    async fn execute_calls(
        &self,
        calls: &[ProposedCall],
        scope: &SessionScope,
        observer: &dyn TurnObserver,
    ) -> Vec<ExecutionResult> {
        let results = self.executor.execute_all(calls, scope, observer).await;
        for (call, result) in calls.iter().zip(&results) {
            self.conversation_logger.log(ConversationEvent::new(
                "capability_result",
                json!({
                    "session": scope.session_id().as_str(),
                    "call_id": call.call_id,
                    "capability": call.capability_name,
                    "arguments": call.arguments,
                    "result": result,
                }),
            ));
        }
        results
    }

    fn log_interpretation(&self, scope: &SessionScope, query: &str, response: &AgentResponse) {
        self.conversation_logger.log(ConversationEvent::new(
            "interpretation",
            json!({
                "session": scope.session_id().as_str(),
                "backend": self.adapter.backend_name(),
                "query": query,
                "text": response.text(),
                "calls": response.proposed_calls(),
            }),
        ));
    }

    fn log_final_response(&self, scope: &SessionScope, response: &str, has_errors: bool) {
        self.conversation_logger.log(ConversationEvent::new(
            "final_response",
            json!({
                "session": scope.session_id().as_str(),
                "response": response,
                "has_errors": has_errors,
            }),
        ));
    }
}

/// Move the turn to `next` and report it.
fn advance(phase: &mut TurnPhase, next: TurnPhase, observer: &dyn TurnObserver) {
    debug_assert!(
        phase.can_transition_to(next),
        "invalid turn transition {} -> {}",
        phase,
        next
    );
    *phase = next;
    observer.on_phase(next);
}
