use std::time::Duration;

use chain_erg::{ErgError, ValidationError};
use thiserror::Error;

use crate::amount::format_erg;
use crate::wallet::WalletOperation;

/// Failures of the wallet session and its external calls.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no wallet extension found after {attempts} attempts")]
    WalletNotFound { attempts: u32 },

    #[error("wallet connection rejected")]
    ConnectionRejected,

    #[error("wallet API unavailable: {0}")]
    ApiUnavailable(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: WalletOperation,
        after: Duration,
    },

    #[error("{0} cancelled")]
    Cancelled(WalletOperation),

    #[error("signature rejected: {0}")]
    SignatureRejected(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("{operation} failed: {reason}")]
    RequestFailed {
        operation: WalletOperation,
        reason: String,
    },

    #[error("malformed response to {operation}: {reason}")]
    MalformedResponse {
        operation: WalletOperation,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum DonationError {
    #[error(transparent)]
    Chain(#[from] ErgError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("transaction failed validation: {0:?}")]
    ValidationFailed(Vec<ValidationError>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl DonationError {
    /// Single status line for the donation modal.
    pub fn user_message(&self) -> String {
        match self {
            DonationError::Session(e) => match e {
                SessionError::WalletNotFound { .. } => {
                    "No Ergo wallet extension found. Install one and reload the page.".into()
                }
                SessionError::ConnectionRejected => "Wallet connection was declined.".into(),
                SessionError::ApiUnavailable(_) => {
                    "The wallet is not available. Reconnect and try again.".into()
                }
                SessionError::Timeout { operation, .. } => {
                    format!("The wallet did not answer the {operation} in time. Please try again.")
                }
                SessionError::Cancelled(_) => "Donation cancelled.".into(),
                SessionError::SignatureRejected(_) => "Transaction signing was declined.".into(),
                SessionError::SubmissionFailed(reason) => {
                    format!("The network did not accept the transaction: {reason}")
                }
                SessionError::RequestFailed { operation, .. }
                | SessionError::MalformedResponse { operation, .. } => {
                    format!("Could not complete the {operation}. Please try again.")
                }
            },
            DonationError::Chain(e) => match e {
                ErgError::InsufficientFunds {
                    required,
                    available,
                } => format!(
                    "Insufficient funds: {} ERG needed, wallet has {} ERG.",
                    format_erg(*required),
                    format_erg(*available)
                ),
                ErgError::SelfDonationRejected => {
                    "You cannot donate from the receiving wallet.".into()
                }
                ErgError::AddressResolution { .. }
                | ErgError::UnsupportedAddressFormat(_)
                | ErgError::InvalidCharacter { .. } => {
                    "The donation address could not be resolved.".into()
                }
                other => format!("Could not build the transaction: {other}"),
            },
            DonationError::ValidationFailed(_) => {
                "The transaction failed safety checks and was not sent.".into()
            }
            DonationError::Config(reason) => format!("Donations are misconfigured: {reason}"),
            DonationError::InvalidAmount(reason) => format!("Invalid amount: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        let err = SessionError::Timeout {
            operation: WalletOperation::Sign,
            after: Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "signature request timed out after 3s");
    }

    #[test]
    fn chain_error_converts() {
        let err: DonationError = ErgError::SelfDonationRejected.into();
        assert!(matches!(err, DonationError::Chain(ErgError::SelfDonationRejected)));
    }

    #[test]
    fn session_errors_have_distinct_messages() {
        let errors = [
            SessionError::WalletNotFound { attempts: 30 },
            SessionError::ConnectionRejected,
            SessionError::ApiUnavailable("gone".into()),
            SessionError::Cancelled(WalletOperation::Connect),
            SessionError::SignatureRejected("no".into()),
            SessionError::SubmissionFailed("double spend".into()),
        ];
        let mut messages: Vec<String> = errors
            .into_iter()
            .map(|e| DonationError::from(e).user_message())
            .collect();
        let total = messages.len();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), total);
    }

    #[test]
    fn insufficient_funds_message_uses_erg() {
        let err = DonationError::from(ErgError::InsufficientFunds {
            required: 1_500_000_000,
            available: 250_000_000,
        });
        assert_eq!(
            err.user_message(),
            "Insufficient funds: 1.5 ERG needed, wallet has 0.25 ERG."
        );
    }

    #[test]
    fn submission_reason_is_shown() {
        let err = DonationError::from(SessionError::SubmissionFailed("double spend".into()));
        assert!(err.user_message().contains("double spend"));
    }
}
