use thiserror::Error;

/// Ergo chain operation errors.
#[derive(Debug, Error)]
pub enum ErgError {
    #[error("invalid base58 character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },

    #[error("unsupported address format: {0}")]
    UnsupportedAddressFormat(String),

    #[error("failed to resolve address {address}: {source}")]
    AddressResolution {
        address: String,
        #[source]
        source: Box<ErgError>,
    },

    #[error("insufficient funds: need {required} nanoERG, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("donation address belongs to the sending wallet")]
    SelfDonationRejected,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid box: {0}")]
    InvalidBox(String),

    #[error("amount overflow: {0}")]
    AmountOverflow(String),

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}
