use serde::{Deserialize, Serialize};

/// Block explorer for Ergo mainnet.
pub const MAINNET_EXPLORER: &str = "https://explorer.ergoplatform.com/en";

/// Block explorer for Ergo testnet.
pub const TESTNET_EXPLORER: &str = "https://testnet.ergoplatform.com/en";

/// Supported Ergo networks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErgNetwork {
    #[default]
    Mainnet,
    Testnet,
}

impl ErgNetwork {
    /// First byte of a pay-to-public-key address on this network
    /// (network prefix plus the P2PK address type).
    pub fn p2pk_prefix(self) -> u8 {
        match self {
            ErgNetwork::Mainnet => 0x01,
            ErgNetwork::Testnet => 0x11,
        }
    }

    /// Return the block explorer base URL for this network.
    pub fn explorer_url(self) -> &'static str {
        match self {
            ErgNetwork::Mainnet => MAINNET_EXPLORER,
            ErgNetwork::Testnet => TESTNET_EXPLORER,
        }
    }

    /// Shareable explorer link for a submitted transaction.
    pub fn transaction_link(self, tx_id: &str) -> String {
        format!("{}/transactions/{}", self.explorer_url(), tx_id)
    }
}

impl std::fmt::Display for ErgNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErgNetwork::Mainnet => write!(f, "mainnet"),
            ErgNetwork::Testnet => write!(f, "testnet"),
        }
    }
}
