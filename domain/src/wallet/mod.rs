//! Session-scoped wallet state.
//!
//! Holds the public addresses created during a session. Key material never
//! enters this type; signing and key storage are external concerns.

use serde::{Deserialize, Serialize};

/// Address created for the session, with the provider that created it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub address: String,
    pub provider: String,
}

/// Wallets known to one session, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletContext {
    wallets: Vec<WalletRecord>,
}

impl WalletContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new address. Addresses are compared case-insensitively, so
    /// recording the same account twice is a no-op.
    pub fn record(&mut self, address: impl Into<String>, provider: impl Into<String>) -> bool {
        let address = address.into();
        if self.contains(&address) {
            return false;
        }
        self.wallets.push(WalletRecord {
            address,
            provider: provider.into(),
        });
        true
    }

    pub fn contains(&self, address: &str) -> bool {
        self.wallets
            .iter()
            .any(|w| w.address.eq_ignore_ascii_case(address))
    }

    /// The most recently created wallet; write capabilities send from it.
    pub fn active(&self) -> Option<&WalletRecord> {
        self.wallets.last()
    }

    pub fn wallets(&self) -> &[WalletRecord] {
        &self.wallets
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
