use std::collections::HashMap;

use tracing::warn;

use crate::base58;
use crate::error::ErgError;
use crate::network::ErgNetwork;

/// ErgoTree header for `proveDlog(<pubkey>)`; the compressed key follows.
pub const P2PK_TREE_PREFIX: &str = "0008cd";

/// Prefix byte + 33-byte compressed public key. The 4-byte checksum that
/// follows in a full address is not inspected.
const MIN_P2PK_LEN: usize = 34;

/// Build the P2PK ErgoTree for a 33-byte compressed public key.
pub fn p2pk_tree(pubkey: &[u8; 33]) -> String {
    format!("{P2PK_TREE_PREFIX}{}", hex::encode(pubkey))
}

/// Converts pay-to-public-key addresses into hex-encoded ErgoTrees.
///
/// An override table maps addresses to precomputed trees. It is consulted
/// only when regular resolution fails, and every use is logged.
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    network: ErgNetwork,
    overrides: HashMap<String, String>,
}

impl AddressResolver {
    pub fn new(network: ErgNetwork) -> Self {
        AddressResolver {
            network,
            overrides: HashMap::new(),
        }
    }

    /// Register a precomputed tree for `address`.
    pub fn with_override(mut self, address: impl Into<String>, tree: impl Into<String>) -> Self {
        self.overrides.insert(address.into(), tree.into());
        self
    }

    pub fn network(&self) -> ErgNetwork {
        self.network
    }

    /// Resolve `address` into its ErgoTree.
    pub fn resolve(&self, address: &str) -> Result<String, ErgError> {
        match self.decode_p2pk(address) {
            Ok(tree) => Ok(tree),
            Err(cause) => match self.overrides.get(address) {
                Some(tree) => {
                    warn!(%address, %cause, "address resolution failed, using configured override");
                    Ok(tree.clone())
                }
                None => Err(ErgError::AddressResolution {
                    address: address.to_string(),
                    source: Box::new(cause),
                }),
            },
        }
    }

    fn decode_p2pk(&self, address: &str) -> Result<String, ErgError> {
        let bytes = base58::decode(address)?;

        if bytes.len() < MIN_P2PK_LEN {
            return Err(ErgError::UnsupportedAddressFormat(format!(
                "expected at least {MIN_P2PK_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let expected = self.network.p2pk_prefix();
        if bytes[0] != expected {
            return Err(ErgError::UnsupportedAddressFormat(format!(
                "expected P2PK prefix {expected:#04x} for {}, got {:#04x}",
                self.network, bytes[0]
            )));
        }

        Ok(format!("{P2PK_TREE_PREFIX}{}", hex::encode(&bytes[1..MIN_P2PK_LEN])))
    }
}
