use std::collections::BTreeMap;
use std::time::Duration;

use chain_erg::{
    AddressResolver, ErgNetwork, ValidationContext, DEFAULT_FEE, FEE_TREE, MIN_BOX_VALUE, MIN_FEE,
    NANOERGS_PER_ERG,
};
use serde::{Deserialize, Serialize};

use crate::error::DonationError;
use crate::wallet::WalletOperation;

/// Address donations are sent to unless configured otherwise.
pub const DEFAULT_DONATION_ADDRESS: &str = "9hAvZsTVfkNENXY3YC9UbWrj4JY6guqzW4vTApHE3iGHxRcW8k5";

/// Precomputed ErgoTree of [`DEFAULT_DONATION_ADDRESS`].
pub const DEFAULT_DONATION_TREE: &str =
    "0008cd035d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d";

/// Donation settings. Every field has a default, so a JSON document only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationConfig {
    pub network: ErgNetwork,
    pub donation_address: String,
    /// Miner fee contract, hex-encoded ErgoTree.
    pub fee_tree: String,
    /// Smallest fee the validator accepts, in nanoERG.
    pub min_fee: u64,
    /// Fee paid by each donation, in nanoERG.
    pub fee: u64,
    pub min_box_value: u64,
    pub min_donation: u64,
    /// Preset amounts offered in the modal, in nanoERG.
    pub presets: Vec<u64>,
    /// Precomputed trees used only when an address fails to resolve.
    pub address_overrides: BTreeMap<String, String>,
    pub session: SessionConfig,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            network: ErgNetwork::Mainnet,
            donation_address: DEFAULT_DONATION_ADDRESS.into(),
            fee_tree: FEE_TREE.into(),
            min_fee: MIN_FEE,
            fee: DEFAULT_FEE,
            min_box_value: MIN_BOX_VALUE,
            min_donation: NANOERGS_PER_ERG / 100,
            presets: vec![
                NANOERGS_PER_ERG,
                5 * NANOERGS_PER_ERG,
                10 * NANOERGS_PER_ERG,
                25 * NANOERGS_PER_ERG,
            ],
            address_overrides: BTreeMap::from([(
                DEFAULT_DONATION_ADDRESS.to_string(),
                DEFAULT_DONATION_TREE.to_string(),
            )]),
            session: SessionConfig::default(),
        }
    }
}

impl DonationConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, DonationError> {
        let config: DonationConfig = serde_json::from_str(json)
            .map_err(|e| DonationError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DonationError> {
        if self.donation_address.trim().is_empty() {
            return Err(DonationError::Config("donation address is empty".into()));
        }
        if self.fee_tree.is_empty() || hex::decode(&self.fee_tree).is_err() {
            return Err(DonationError::Config("fee tree must be non-empty hex".into()));
        }
        if self.fee < self.min_fee {
            return Err(DonationError::Config(format!(
                "fee {} is below the minimum fee {}",
                self.fee, self.min_fee
            )));
        }
        if self.min_box_value == 0 {
            return Err(DonationError::Config("minimum box value must be positive".into()));
        }
        if self.min_donation < self.min_box_value {
            return Err(DonationError::Config(format!(
                "minimum donation {} is below the minimum box value {}",
                self.min_donation, self.min_box_value
            )));
        }
        if let Some(preset) = self.presets.iter().find(|p| **p < self.min_donation) {
            return Err(DonationError::Config(format!(
                "preset {preset} is below the minimum donation"
            )));
        }
        self.session.validate()
    }

    /// Resolver for the configured network, seeded with the override table.
    pub fn address_resolver(&self) -> AddressResolver {
        self.address_overrides
            .iter()
            .fold(AddressResolver::new(self.network), |resolver, (address, tree)| {
                resolver.with_override(address.as_str(), tree.as_str())
            })
    }

    pub fn validation_context(&self, donation_tree: String) -> ValidationContext {
        ValidationContext {
            donation_tree,
            fee_tree: self.fee_tree.clone(),
            min_fee: self.min_fee,
            min_box_value: self.min_box_value,
        }
    }
}

/// Wallet polling and per-call timeouts, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub poll_attempts: u32,
    pub poll_interval_ms: u64,
    /// Covers the user reading the consent prompt.
    pub connect_timeout_ms: u64,
    /// Balance, height and UTXO requests.
    pub fetch_timeout_ms: u64,
    /// Covers the user reviewing the transaction.
    pub sign_timeout_ms: u64,
    pub submit_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_attempts: 30,
            poll_interval_ms: 100,
            connect_timeout_ms: 60_000,
            fetch_timeout_ms: 15_000,
            sign_timeout_ms: 300_000,
            submit_timeout_ms: 30_000,
        }
    }
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout_for(&self, operation: WalletOperation) -> Duration {
        let ms = match operation {
            WalletOperation::Detect => self.poll_interval_ms * u64::from(self.poll_attempts),
            WalletOperation::Connect => self.connect_timeout_ms,
            WalletOperation::Balance | WalletOperation::Height | WalletOperation::Utxos => {
                self.fetch_timeout_ms
            }
            WalletOperation::Sign => self.sign_timeout_ms,
            WalletOperation::Submit => self.submit_timeout_ms,
        };
        Duration::from_millis(ms)
    }

    fn validate(&self) -> Result<(), DonationError> {
        if self.poll_attempts == 0 {
            return Err(DonationError::Config("poll attempts must be positive".into()));
        }
        let timeouts = [
            self.connect_timeout_ms,
            self.fetch_timeout_ms,
            self.sign_timeout_ms,
            self.submit_timeout_ms,
        ];
        if timeouts.contains(&0) {
            return Err(DonationError::Config("timeouts must be positive".into()));
        }
        Ok(())
    }
}
