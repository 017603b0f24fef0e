//! The boundary to the wallet extension's injected API.
//!
//! The extension itself is an external collaborator: this crate only sees the
//! handle it injects and the six calls it answers.

use std::sync::Arc;

use async_trait::async_trait;
use chain_erg::{SignedTransaction, UnsignedTransaction, UnspentOutput};
use thiserror::Error;

/// Failure reported by the injected API itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletApiError {
    #[error("rejected by user: {0}")]
    Rejected(String),

    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),
}

/// The injected wallet API. Every call may suspend until the user or the
/// extension answers.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Ask the user for connection consent.
    async fn connect(&self) -> Result<bool, WalletApiError>;

    /// Confirmed balance in nanoERG, as a decimal string.
    async fn get_balance(&self) -> Result<String, WalletApiError>;

    async fn get_current_height(&self) -> Result<u32, WalletApiError>;

    /// Spendable boxes owned by the wallet.
    async fn get_utxos(&self) -> Result<Vec<UnspentOutput>, WalletApiError>;

    async fn sign_tx(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, WalletApiError>;

    /// Broadcast a signed transaction and return its id.
    async fn submit_tx(&self, tx: &SignedTransaction) -> Result<String, WalletApiError>;
}

/// Locates the injected API, if the extension has installed one yet.
pub trait WalletProvider: Send + Sync {
    fn injected_api(&self) -> Option<Arc<dyn WalletApi>>;
}

/// The external calls a session makes, used to label timeouts and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletOperation {
    Detect,
    Connect,
    Balance,
    Height,
    Utxos,
    Sign,
    Submit,
}

impl std::fmt::Display for WalletOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WalletOperation::Detect => "wallet detection",
            WalletOperation::Connect => "wallet connection",
            WalletOperation::Balance => "balance request",
            WalletOperation::Height => "height request",
            WalletOperation::Utxos => "UTXO request",
            WalletOperation::Sign => "signature request",
            WalletOperation::Submit => "submission",
        };
        f.write_str(name)
    }
}
