//! Ergo chain support for the donation flow.
//!
//! Provides base58 decoding, P2PK address to ErgoTree resolution, largest-first
//! box selection, donation transaction building, and post-build validation.
//! Everything here is synchronous and side-effect free; talking to a wallet is
//! the job of `donation-core`.

pub mod address;
pub mod base58;
pub mod ergo_box;
pub mod error;
pub mod network;
pub mod transaction;
pub mod utxo;
pub mod validation;

// Re-export key public types for ergonomic imports.
pub use address::{p2pk_tree, AddressResolver, P2PK_TREE_PREFIX};
pub use ergo_box::{
    SignedTransaction, TokenAmount, TransactionOutput, UnsignedTransaction, UnspentOutput,
};
pub use error::ErgError;
pub use network::ErgNetwork;
pub use transaction::{build_donation_tx, BuildResult, BuildSummary, DonationParams};
pub use utxo::{select_utxos, UtxoSelection};
pub use validation::{validate, ValidationContext, ValidationError, ValidationReport, ValidationWarning};

/// ErgoTree of the standard miner fee contract.
pub const FEE_TREE: &str = "1005040004000e36100204a00b08cd0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798ea02d192a39a8cc7a701730073011001020402d19683030193a38cc7b2a57300000193c2b2a57301007473027303830108cdeeac93b1a57304";

/// Smallest fee miners accept, in nanoERG.
pub const MIN_FEE: u64 = 1_000_000;

/// Fee used when the caller does not pick one, in nanoERG.
pub const DEFAULT_FEE: u64 = 1_100_000;

/// Smallest value a box may hold, in nanoERG.
pub const MIN_BOX_VALUE: u64 = 1_000_000;

/// nanoERG per ERG.
pub const NANOERGS_PER_ERG: u64 = 1_000_000_000;
