//! An owned wallet session: detection, consent, and the guarded calls the
//! donation flow makes through the injected API.
//!
//! Every external call is raced against its configured timeout and the
//! caller's [`CancelToken`]. Nothing is retried except the presence poll.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chain_erg::{SignedTransaction, UnsignedTransaction, UnspentOutput};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::wallet::{WalletApi, WalletApiError, WalletOperation, WalletProvider};

/// Cancels the flow holding the paired [`CancelToken`].
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Observed by every suspending call; fires once the paired handle cancels.
#[derive(Debug, Clone)]
pub struct CancelToken {
    receiver: watch::Receiver<bool>,
}

/// Create a linked handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (sender, receiver) = watch::channel(false);
    (CancelHandle { sender }, CancelToken { receiver })
}

impl CancelToken {
    /// A token nobody can cancel.
    pub fn never() -> Self {
        let (_sender, receiver) = watch::channel(false);
        CancelToken { receiver }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancelled; pends forever if the handle is dropped first.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Outcome of polling for the injected API.
pub enum WalletDetection {
    Found(Arc<dyn WalletApi>),
    NotFound { attempts: u32 },
    Cancelled,
}

impl std::fmt::Debug for WalletDetection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletDetection::Found(_) => f.write_str("Found(..)"),
            WalletDetection::NotFound { attempts } => {
                f.debug_struct("NotFound").field("attempts", attempts).finish()
            }
            WalletDetection::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Poll `provider` up to `attempts` times, `interval` apart.
pub async fn poll_for_wallet(
    provider: &dyn WalletProvider,
    attempts: u32,
    interval: Duration,
    cancel: &CancelToken,
) -> WalletDetection {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        if cancel.is_cancelled() {
            return WalletDetection::Cancelled;
        }
        if let Some(api) = provider.injected_api() {
            debug!(attempt, "wallet API detected");
            return WalletDetection::Found(api);
        }
        if attempt < attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return WalletDetection::Cancelled,
                _ = sleep(interval) => {}
            }
        }
    }
    warn!(attempts, "wallet API not detected");
    WalletDetection::NotFound { attempts }
}

/// Connection to one wallet extension. Owned by whoever drives a donation;
/// operations that need the wallet borrow it for their whole duration.
pub struct WalletSession {
    config: SessionConfig,
    api: Option<Arc<dyn WalletApi>>,
}

impl WalletSession {
    pub fn new(config: SessionConfig) -> Self {
        WalletSession { config, api: None }
    }

    pub fn is_connected(&self) -> bool {
        self.api.is_some()
    }

    /// Detect the wallet and request consent. A connected session returns
    /// immediately.
    pub async fn connect(
        &mut self,
        provider: &dyn WalletProvider,
        cancel: &CancelToken,
    ) -> Result<(), SessionError> {
        if self.is_connected() {
            return Ok(());
        }

        let api = match poll_for_wallet(
            provider,
            self.config.poll_attempts,
            self.config.poll_interval(),
            cancel,
        )
        .await
        {
            WalletDetection::Found(api) => api,
            WalletDetection::NotFound { attempts } => {
                return Err(SessionError::WalletNotFound { attempts })
            }
            WalletDetection::Cancelled => {
                return Err(SessionError::Cancelled(WalletOperation::Detect))
            }
        };

        let granted = self
            .guarded(WalletOperation::Connect, cancel, api.connect())
            .await?;
        if !granted {
            info!("wallet connection declined");
            return Err(SessionError::ConnectionRejected);
        }

        info!("wallet connected");
        self.api = Some(api);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.api.take().is_some() {
            info!("wallet disconnected");
        }
    }

    /// Confirmed balance in nanoERG.
    pub async fn balance(&self, cancel: &CancelToken) -> Result<u64, SessionError> {
        let api = self.api()?;
        let raw = self
            .guarded(WalletOperation::Balance, cancel, api.get_balance())
            .await?;
        raw.trim()
            .parse()
            .map_err(|e| SessionError::MalformedResponse {
                operation: WalletOperation::Balance,
                reason: format!("{raw:?}: {e}"),
            })
    }

    pub async fn current_height(&self, cancel: &CancelToken) -> Result<u32, SessionError> {
        let api = self.api()?;
        self.guarded(WalletOperation::Height, cancel, api.get_current_height())
            .await
    }

    /// Fresh spendable boxes; nothing is cached between calls.
    pub async fn utxos(&self, cancel: &CancelToken) -> Result<Vec<UnspentOutput>, SessionError> {
        let api = self.api()?;
        let utxos = self
            .guarded(WalletOperation::Utxos, cancel, api.get_utxos())
            .await?;
        debug!(count = utxos.len(), "fetched wallet boxes");
        Ok(utxos)
    }

    pub async fn sign(
        &self,
        tx: &UnsignedTransaction,
        cancel: &CancelToken,
    ) -> Result<SignedTransaction, SessionError> {
        let api = self.api()?;
        self.guarded(WalletOperation::Sign, cancel, api.sign_tx(tx))
            .await
    }

    /// Submit and return the transaction id.
    pub async fn submit(
        &self,
        tx: &SignedTransaction,
        cancel: &CancelToken,
    ) -> Result<String, SessionError> {
        let api = self.api()?;
        let tx_id = self
            .guarded(WalletOperation::Submit, cancel, api.submit_tx(tx))
            .await?;
        if tx_id.trim().is_empty() {
            return Err(SessionError::MalformedResponse {
                operation: WalletOperation::Submit,
                reason: "empty transaction id".into(),
            });
        }
        Ok(tx_id)
    }

    fn api(&self) -> Result<Arc<dyn WalletApi>, SessionError> {
        self.api
            .clone()
            .ok_or_else(|| SessionError::ApiUnavailable("wallet is not connected".into()))
    }

    async fn guarded<T, F>(
        &self,
        operation: WalletOperation,
        cancel: &CancelToken,
        call: F,
    ) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, WalletApiError>>,
    {
        let limit = self.config.timeout_for(operation);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(%operation, "cancelled");
                Err(SessionError::Cancelled(operation))
            }
            outcome = timeout(limit, call) => match outcome {
                Ok(result) => result.map_err(|e| classify(operation, e)),
                Err(_) => {
                    warn!(%operation, ?limit, "wallet call timed out");
                    Err(SessionError::Timeout { operation, after: limit })
                }
            }
        }
    }
}

fn classify(operation: WalletOperation, err: WalletApiError) -> SessionError {
    match (operation, err) {
        (_, WalletApiError::Unavailable(reason)) => SessionError::ApiUnavailable(reason),
        (WalletOperation::Connect, WalletApiError::Rejected(_)) => SessionError::ConnectionRejected,
        (WalletOperation::Sign, WalletApiError::Rejected(reason)) => {
            SessionError::SignatureRejected(reason)
        }
        (WalletOperation::Submit, WalletApiError::Rejected(reason))
        | (WalletOperation::Submit, WalletApiError::Failed(reason)) => {
            SessionError::SubmissionFailed(reason)
        }
        (operation, WalletApiError::Rejected(reason))
        | (operation, WalletApiError::Failed(reason)) => {
            SessionError::RequestFailed { operation, reason }
        }
    }
}
