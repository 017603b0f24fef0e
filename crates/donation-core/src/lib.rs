//! Wallet-driven donation flow for Ergo.
//!
//! A [`WalletSession`] wraps the injected wallet API with timeouts and
//! cancellation; [`process_donation`] drives one donation through it, using
//! `chain-erg` to build and check the transaction before the wallet signs it.

pub mod amount;
pub mod config;
pub mod donation;
pub mod error;
pub mod session;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use amount::{format_erg, parse_erg, resolve_amount, AmountChoice};
pub use config::{DonationConfig, SessionConfig, DEFAULT_DONATION_ADDRESS, DEFAULT_DONATION_TREE};
pub use donation::{process_donation, DonationReceipt, DonationStatus, StatusReporter};
pub use error::{DonationError, SessionError};
pub use session::{cancel_pair, poll_for_wallet, CancelHandle, CancelToken, WalletDetection, WalletSession};
pub use wallet::{WalletApi, WalletApiError, WalletOperation, WalletProvider};
