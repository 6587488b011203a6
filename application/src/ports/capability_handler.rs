//! Capability handler port
//!
//! Defines the interface for the concrete operations behind each capability
//! (chain reads, transaction building, wallet creation).

use async_trait::async_trait;
use chain_agent_domain::{ProposedCall, SessionId, WalletContext, WalletRecord};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Failure of a capability handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Expected, user-facing failure (bad address, unknown tx, ...)
    #[error("{0}")]
    Domain(String),

    /// Anything else: transport, decoding, bugs
    #[error("{0}")]
    Unexpected(String),
}

impl CapabilityError {
    pub fn domain(message: impl Into<String>) -> Self {
        CapabilityError::Domain(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        CapabilityError::Unexpected(message.into())
    }
}

/// Per-session state handed to every handler invocation.
///
/// Cloning is cheap; clones share the same wallet context.
#[derive(Debug, Clone)]
pub struct SessionScope {
    session_id: SessionId,
    wallet: Arc<Mutex<WalletContext>>,
}

impl SessionScope {
    pub fn new(session_id: SessionId) -> Self {
        Self::with_wallet(session_id, Arc::new(Mutex::new(WalletContext::new())))
    }

    pub fn with_wallet(session_id: SessionId, wallet: Arc<Mutex<WalletContext>>) -> Self {
        Self { session_id, wallet }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Record a wallet created during this session.
    pub fn record_wallet(&self, address: impl Into<String>, provider: impl Into<String>) -> bool {
        self.lock_wallet().record(address, provider)
    }

    /// The wallet write capabilities send from, if one was created.
    pub fn active_wallet(&self) -> Option<WalletRecord> {
        self.lock_wallet().active().cloned()
    }

    // A poisoned lock only means another handler panicked mid-update; the
    // record list itself is still consistent.
    fn lock_wallet(&self) -> MutexGuard<'_, WalletContext> {
        self.wallet.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Concrete operation behind one capability name
///
/// Arguments have already passed the required-field check when `invoke`
/// runs; type checks are the handler's job.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    async fn invoke(
        &self,
        call: &ProposedCall,
        scope: &SessionScope,
    ) -> Result<Value, CapabilityError>;
}
