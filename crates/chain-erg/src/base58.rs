//! Base58 (Bitcoin alphabet) decoding for Ergo addresses.
//!
//! Ergo reuses the Bitcoin alphabet, which leaves out `0`, `O`, `I` and `l`.
//! Each leading `'1'` is a leading zero byte and the output is big-endian.

use crate::error::ErgError;

/// Decode a base58 string into raw bytes.
///
/// An empty string decodes to a single zero byte.
pub fn decode(input: &str) -> Result<Vec<u8>, ErgError> {
    if input.is_empty() {
        return Ok(vec![0]);
    }

    bs58::decode(input).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            ErgError::InvalidCharacter { character, index }
        }
        bs58::decode::Error::NonAsciiCharacter { index } => ErgError::InvalidCharacter {
            character: input
                .get(index..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            index,
        },
        other => ErgError::UnsupportedAddressFormat(format!("base58 decode failed: {other}")),
    })
}

/// Encode raw bytes as a base58 string.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}
