//! Session manager.
//!
//! The caller-facing boundary: `handle_turn(session_id, text)` and
//! `update_context(session_id, query, response)`. Each session owns its
//! conversation context and wallet context and admits one turn at a time;
//! sessions are independent and may run turns in parallel.

use super::run_turn::{RunTurnInput, RunTurnUseCase, TurnError};
use crate::config::AgentParams;
use crate::ports::capability_handler::SessionScope;
use crate::ports::turn_observer::{NoTurnObserver, TurnObserver};
use chain_agent_domain::{
    ConversationContext, DomainError, Message, SessionId, TurnOutcome, WalletContext,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Append a finished turn to `context`, returning the new context.
///
/// Pure: the input context is left as it was.
pub fn update_context(
    context: &ConversationContext,
    query: &str,
    response: &str,
) -> ConversationContext {
    context.append(Message::user(query), Message::assistant(response))
}

struct SessionState {
    context: Mutex<ConversationContext>,
    wallet: Arc<Mutex<WalletContext>>,
    in_flight: AtomicBool,
}

impl SessionState {
    fn new(context: ConversationContext) -> Self {
        Self {
            context: Mutex::new(context),
            wallet: Arc::new(Mutex::new(WalletContext::new())),
            in_flight: AtomicBool::new(false),
        }
    }

    fn context(&self) -> MutexGuard<'_, ConversationContext> {
        self.context
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Marks a session busy for as long as it lives.
struct InFlightGuard(Arc<SessionState>);

impl InFlightGuard {
    fn acquire(state: Arc<SessionState>) -> Option<Self> {
        state
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(state))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

/// Owns per-session state and runs turns against it.
pub struct SessionManager {
    turn: RunTurnUseCase,
    params: AgentParams,
    empty_context: ConversationContext,
    sessions: Mutex<HashMap<SessionId, Arc<SessionState>>>,
}

impl SessionManager {
    pub fn new(turn: RunTurnUseCase, params: AgentParams) -> Result<Self, DomainError> {
        let empty_context = ConversationContext::with_capacity(params.context_capacity)?;
        Ok(Self {
            turn,
            params,
            empty_context,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    /// Run one turn without progress reporting.
    pub async fn handle_turn(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<TurnOutcome, TurnError> {
        self.handle_turn_observed(session_id, text, &NoTurnObserver)
            .await
    }

    /// Run one turn on `session_id`.
    ///
    /// Fails with [`TurnError::SessionBusy`] if the session already has a
    /// turn in flight, and with [`TurnError::Timeout`] if the configured turn
    /// timeout elapses. The context is not updated; call
    /// [`update_context`](Self::update_context) once the answer is accepted.
    pub async fn handle_turn_observed(
        &self,
        session_id: &SessionId,
        text: &str,
        observer: &dyn TurnObserver,
    ) -> Result<TurnOutcome, TurnError> {
        let state = self.session(session_id);
        let Some(_guard) = InFlightGuard::acquire(state.clone()) else {
            warn!("Rejected turn on busy session {}", session_id);
            return Err(TurnError::SessionBusy(session_id.to_string()));
        };

        let context = state.context().clone();
        let scope = SessionScope::with_wallet(session_id.clone(), state.wallet.clone());
        let input =
            RunTurnInput::new(text, context).with_no_call_policy(self.params.no_call_policy);

        let run = self.turn.execute(input, &scope, observer);
        match self.params.turn_timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| TurnError::Timeout(limit))?,
            None => run.await,
        }
    }

    /// Record a finished turn in the session's context and return the new
    /// context.
    pub fn update_context(
        &self,
        session_id: &SessionId,
        query: &str,
        response: &str,
    ) -> ConversationContext {
        let state = self.session(session_id);
        let mut context = state.context();
        *context = update_context(&context, query, response);
        debug!(
            "Session {} context now holds {} message(s)",
            session_id,
            context.len()
        );
        context.clone()
    }

    /// Snapshot of the session's context.
    pub fn context(&self, session_id: &SessionId) -> ConversationContext {
        self.session(session_id).context().clone()
    }

    pub fn clear_context(&self, session_id: &SessionId) {
        let state = self.session(session_id);
        let mut context = state.context();
        *context = context.cleared();
    }

    pub fn wallet(&self, session_id: &SessionId) -> WalletContext {
        let state = self.session(session_id);
        let wallet = state
            .wallet
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        wallet.clone()
    }

    /// Drop all state of a session.
    pub fn end_session(&self, session_id: &SessionId) -> bool {
        self.sessions().remove(session_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    fn session(&self, session_id: &SessionId) -> Arc<SessionState> {
        self.sessions()
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(SessionState::new(self.empty_context.clone())))
            .clone()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<SessionState>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::capability_handler::CapabilityError;
    use crate::ports::model_backend::BackendError;
    use crate::use_cases::execute_capability::tests::StubHandler;
    use crate::use_cases::execute_capability::{CapabilityExecutor, HandlerTable};
    use crate::use_cases::model_adapter::ModelAdapter;
    use crate::use_cases::model_adapter::tests::ScriptedBackend;
    use chain_agent_domain::{
        AgentResponse, CapabilityRegistry, CapabilitySpec, NoCallPolicy, ProposedCall,
    };
    use serde_json::json;
    use std::time::Duration;

    fn manager(
        responses: Vec<Result<AgentResponse, BackendError>>,
        delay_ms: u64,
        params: AgentParams,
    ) -> (Arc<SessionManager>, Arc<ScriptedBackend>) {
        let registry = Arc::new(
            CapabilityRegistry::builder()
                .register(CapabilitySpec::new("getLatestBlock", "latest"))
                .build()
                .unwrap(),
        );
        let table = HandlerTable::builder()
            .register(
                "getLatestBlock",
                Arc::new(StubHandler {
                    delay_ms,
                    outcome: Ok::<_, CapabilityError>(json!({"blockNumber": 100})),
                }),
            )
            .build(&registry)
            .unwrap();
        let backend = Arc::new(ScriptedBackend::new(responses));
        let turn = RunTurnUseCase::new(
            ModelAdapter::new(backend.clone(), registry.clone()),
            CapabilityExecutor::new(registry, Arc::new(table)),
        );
        (
            Arc::new(SessionManager::new(turn, params).unwrap()),
            backend,
        )
    }

    fn latest_block_call() -> Result<AgentResponse, BackendError> {
        Ok(AgentResponse::from_parts(
            None,
            vec![ProposedCall::new("call-1", "getLatestBlock")],
        ))
    }

    fn id(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    #[test]
    fn test_update_context_is_pure() {
        let before = ConversationContext::new();
        let after = update_context(&before, "q", "a");
        assert!(before.is_empty());
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_rejects_invalid_capacity() {
        let registry = Arc::new(CapabilityRegistry::default());
        let table = HandlerTable::builder().build(&registry).unwrap();
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let turn = RunTurnUseCase::new(
            ModelAdapter::new(backend, registry.clone()),
            CapabilityExecutor::new(registry, Arc::new(table)),
        );
        let result = SessionManager::new(turn, AgentParams::default().with_context_capacity(1));
        assert!(matches!(
            result,
            Err(DomainError::InvalidContextCapacity(1))
        ));
    }

    #[tokio::test]
    async fn test_turn_then_update_context() {
        let (manager, _) = manager(
            vec![latest_block_call(), Ok(AgentResponse::text_only("Block 100."))],
            0,
            AgentParams::default(),
        );
        let session = id("alice");
        let outcome = manager.handle_turn(&session, "latest block?").await.unwrap();
        assert_eq!(outcome.final_response, "Block 100.");

        // handle_turn leaves the context alone
        assert!(manager.context(&session).is_empty());

        let context = manager.update_context(&session, "latest block?", &outcome.final_response);
        assert_eq!(context.len(), 2);
        assert_eq!(manager.context(&session), context);
        assert!(manager.context(&id("bob")).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_turn_on_busy_session_is_rejected() {
        let (manager, _) = manager(
            vec![
                latest_block_call(),
                Ok(AgentResponse::text_only("Block 100.")),
            ],
            1_000,
            AgentParams::default(),
        );
        let session = id("alice");

        let first = {
            let manager = manager.clone();
            let session = session.clone();
            tokio::spawn(async move { manager.handle_turn(&session, "latest block?").await })
        };
        // let the first turn reach the slow handler
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = manager.handle_turn(&session, "again").await;
        assert_eq!(
            second.unwrap_err(),
            TurnError::SessionBusy("alice".to_string())
        );

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.final_response, "Block 100.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_run_independently() {
        let (manager, _) = manager(
            vec![
                latest_block_call(),
                latest_block_call(),
                Ok(AgentResponse::text_only("one")),
                Ok(AgentResponse::text_only("two")),
            ],
            1_000,
            AgentParams::default(),
        );
        let id_a = id("a");
        let id_b = id("b");
        let (a, b) = tokio::join!(
            manager.handle_turn(&id_a, "q"),
            manager.handle_turn(&id_b, "q")
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(manager.session_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_timeout() {
        let (manager, _) = manager(
            vec![latest_block_call(), Ok(AgentResponse::text_only("late"))],
            5_000,
            AgentParams::default().with_turn_timeout(Some(Duration::from_secs(1))),
        );
        let session = id("alice");
        let err = manager.handle_turn(&session, "q").await.unwrap_err();
        assert_eq!(err, TurnError::Timeout(Duration::from_secs(1)));

        // the busy flag is released after a timeout
        let again = manager.handle_turn(&session, "q").await;
        assert!(!matches!(again, Err(TurnError::SessionBusy(_))));
    }

    #[tokio::test]
    async fn test_no_call_policy_from_params() {
        let (manager, backend) = manager(
            vec![
                Ok(AgentResponse::text_only("draft")),
                Ok(AgentResponse::text_only("final")),
            ],
            0,
            AgentParams::default().with_no_call_policy(NoCallPolicy::Finalize),
        );
        let outcome = manager.handle_turn(&id("a"), "hi").await.unwrap();
        assert_eq!(outcome.final_response, "final");
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_eleventh_turn_keeps_window() {
        let (manager, _) = manager(vec![], 0, AgentParams::default());
        let session = id("alice");
        for i in 0..5 {
            manager.update_context(&session, &format!("q{i}"), &format!("a{i}"));
        }
        let third = manager.context(&session).to_vec()[2].clone();
        let context = manager.update_context(&session, "q5", "a5");
        assert_eq!(context.len(), 10);
        assert_eq!(context.first(), Some(&third));
    }

    #[test]
    fn test_clear_and_end_session() {
        let (manager, _) = manager(vec![], 0, AgentParams::default());
        let session = id("alice");
        manager.update_context(&session, "q", "a");
        manager.clear_context(&session);
        assert!(manager.context(&session).is_empty());
        assert!(manager.end_session(&session));
        assert!(!manager.end_session(&session));
    }
}
