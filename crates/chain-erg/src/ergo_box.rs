//! Box and transaction shapes exchanged with the wallet's signer.
//!
//! The JSON layout follows the dApp connector convention: camelCase keys,
//! monetary values and token amounts as decimal strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ErgError;

/// A token balance attached to a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub token_id: String,
    #[serde(with = "amount_str")]
    pub amount: u64,
}

impl TokenAmount {
    pub fn new(token_id: impl Into<String>, amount: u64) -> Result<Self, ErgError> {
        let token = TokenAmount {
            token_id: token_id.into(),
            amount,
        };
        token.check()?;
        Ok(token)
    }

    fn check(&self) -> Result<(), ErgError> {
        if self.token_id.is_empty() {
            return Err(ErgError::InvalidBox("token id is empty".into()));
        }
        if self.amount == 0 {
            return Err(ErgError::InvalidBox(format!(
                "token {} has zero amount",
                self.token_id
            )));
        }
        Ok(())
    }
}

/// A spendable box owned by the wallet. Read-only from our side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawUnspentOutput")]
pub struct UnspentOutput {
    pub box_id: String,
    pub transaction_id: String,
    pub index: u16,
    /// Value in nanoERG.
    #[serde(with = "amount_str")]
    pub value: u64,
    /// Owning script, hex-encoded ErgoTree.
    pub ergo_tree: String,
    pub assets: Vec<TokenAmount>,
    pub creation_height: u32,
    pub additional_registers: BTreeMap<String, String>,
}

impl UnspentOutput {
    /// Create a box, rejecting empty ids, zero values, malformed scripts and
    /// malformed token entries.
    pub fn new(
        box_id: impl Into<String>,
        value: u64,
        ergo_tree: impl Into<String>,
        assets: Vec<TokenAmount>,
        creation_height: u32,
    ) -> Result<Self, ErgError> {
        let utxo = UnspentOutput {
            box_id: box_id.into(),
            transaction_id: String::new(),
            index: 0,
            value,
            ergo_tree: ergo_tree.into(),
            assets,
            creation_height,
            additional_registers: BTreeMap::new(),
        };
        utxo.check()?;
        Ok(utxo)
    }

    /// Record the transaction and output index that created this box.
    pub fn with_origin(mut self, transaction_id: impl Into<String>, index: u16) -> Self {
        self.transaction_id = transaction_id.into();
        self.index = index;
        self
    }

    fn check(&self) -> Result<(), ErgError> {
        if self.box_id.is_empty() {
            return Err(ErgError::InvalidBox("box id is empty".into()));
        }
        if self.value == 0 {
            return Err(ErgError::InvalidBox(format!(
                "box {} has zero value",
                self.box_id
            )));
        }
        check_tree(&self.ergo_tree)?;
        self.assets.iter().try_for_each(TokenAmount::check)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUnspentOutput {
    box_id: String,
    #[serde(default)]
    transaction_id: String,
    #[serde(default)]
    index: u16,
    #[serde(with = "amount_str")]
    value: u64,
    ergo_tree: String,
    #[serde(default)]
    assets: Vec<TokenAmount>,
    creation_height: u32,
    #[serde(default)]
    additional_registers: BTreeMap<String, String>,
}

impl TryFrom<RawUnspentOutput> for UnspentOutput {
    type Error = ErgError;

    fn try_from(raw: RawUnspentOutput) -> Result<Self, Self::Error> {
        let utxo = UnspentOutput {
            box_id: raw.box_id,
            transaction_id: raw.transaction_id,
            index: raw.index,
            value: raw.value,
            ergo_tree: raw.ergo_tree,
            assets: raw.assets,
            creation_height: raw.creation_height,
            additional_registers: raw.additional_registers,
        };
        utxo.check()?;
        Ok(utxo)
    }
}

/// A candidate output of an unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    #[serde(with = "amount_str")]
    pub value: u64,
    pub ergo_tree: String,
    pub assets: Vec<TokenAmount>,
    /// Always empty for donation outputs.
    pub additional_registers: BTreeMap<String, String>,
    pub creation_height: u32,
}

impl TransactionOutput {
    pub fn new(
        value: u64,
        ergo_tree: impl Into<String>,
        assets: Vec<TokenAmount>,
        creation_height: u32,
    ) -> Result<Self, ErgError> {
        let output = TransactionOutput {
            value,
            ergo_tree: ergo_tree.into(),
            assets,
            additional_registers: BTreeMap::new(),
            creation_height,
        };
        if output.value == 0 {
            return Err(ErgError::InvalidBox("output value is zero".into()));
        }
        check_tree(&output.ergo_tree)?;
        output.assets.iter().try_for_each(TokenAmount::check)?;
        Ok(output)
    }
}

/// An unsigned transaction ready to hand to the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub inputs: Vec<UnspentOutput>,
    pub data_inputs: Vec<UnspentOutput>,
    pub outputs: Vec<TransactionOutput>,
}

impl UnsignedTransaction {
    pub fn new(inputs: Vec<UnspentOutput>, outputs: Vec<TransactionOutput>) -> Self {
        UnsignedTransaction {
            inputs,
            data_inputs: Vec::new(),
            outputs,
        }
    }

    /// Sum of input values, or `None` on overflow.
    pub fn total_input_value(&self) -> Option<u64> {
        self.inputs
            .iter()
            .try_fold(0u64, |acc, input| acc.checked_add(input.value))
    }

    /// Sum of output values, or `None` on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, output| acc.checked_add(output.value))
    }
}

/// A transaction signed by the wallet. Opaque apart from its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedTransaction(pub serde_json::Value);

impl SignedTransaction {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(serde_json::Value::as_str)
    }
}

/// Merge `tokens` into the running totals in `acc`, keyed by token id.
///
/// First-seen order is preserved; amounts for a repeated id are added.
pub(crate) fn merge_tokens(acc: &mut Vec<TokenAmount>, tokens: &[TokenAmount]) -> Result<(), ErgError> {
    for token in tokens {
        match acc.iter_mut().find(|t| t.token_id == token.token_id) {
            Some(existing) => {
                existing.amount = existing.amount.checked_add(token.amount).ok_or_else(|| {
                    ErgError::AmountOverflow(format!("token {} total", token.token_id))
                })?;
            }
            None => acc.push(token.clone()),
        }
    }
    Ok(())
}

fn check_tree(tree: &str) -> Result<(), ErgError> {
    if tree.is_empty() {
        return Err(ErgError::InvalidBox("ergo tree is empty".into()));
    }
    hex::decode(tree)
        .map(|_| ())
        .map_err(|e| ErgError::InvalidBox(format!("ergo tree is not hex: {e}")))
}

mod amount_str {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Amount {
            Number(u64),
            Text(String),
        }

        match Amount::deserialize(deserializer)? {
            Amount::Number(n) => Ok(n),
            Amount::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "0008cd035d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d5d";

    #[test]
    fn deserializes_wallet_box_with_string_values() {
        let json = format!(
            r#"{{
                "boxId": "b1",
                "transactionId": "t1",
                "index": 2,
                "value": "1500000",
                "ergoTree": "{TREE}",
                "assets": [{{"tokenId": "tok", "amount": "7"}}],
                "creationHeight": 900000,
                "additionalRegisters": {{}}
            }}"#
        );
        let utxo: UnspentOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(utxo.value, 1_500_000);
        assert_eq!(utxo.index, 2);
        assert_eq!(utxo.assets, vec![TokenAmount::new("tok", 7).unwrap()]);
    }

    #[test]
    fn deserializes_numeric_values_and_missing_optionals() {
        let json = format!(
            r#"{{"boxId": "b1", "value": 42, "ergoTree": "{TREE}", "creationHeight": 1}}"#
        );
        let utxo: UnspentOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(utxo.value, 42);
        assert!(utxo.assets.is_empty());
        assert!(utxo.transaction_id.is_empty());
    }

    #[test]
    fn deserialization_rejects_malformed_box() {
        let json = r#"{"boxId": "b1", "value": "5", "ergoTree": "", "creationHeight": 1}"#;
        let err = serde_json::from_str::<UnspentOutput>(json).unwrap_err();
        assert!(err.to_string().contains("ergo tree is empty"));
    }

    #[test]
    fn constructor_rejects_bad_fields() {
        assert!(UnspentOutput::new("", 1, TREE, vec![], 1).is_err());
        assert!(UnspentOutput::new("b", 0, TREE, vec![], 1).is_err());
        assert!(UnspentOutput::new("b", 1, "zz", vec![], 1).is_err());
        assert!(TokenAmount::new("", 1).is_err());
        assert!(TokenAmount::new("tok", 0).is_err());
        assert!(TransactionOutput::new(0, TREE, vec![], 1).is_err());
        assert!(TransactionOutput::new(1, "", vec![], 1).is_err());
    }

    #[test]
    fn output_serializes_in_connector_shape() {
        let output = TransactionOutput::new(
            1_000_000,
            TREE,
            vec![TokenAmount::new("tok", 3).unwrap()],
            77,
        )
        .unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["value"], "1000000");
        assert_eq!(json["ergoTree"], TREE);
        assert_eq!(json["assets"][0]["tokenId"], "tok");
        assert_eq!(json["assets"][0]["amount"], "3");
        assert_eq!(json["creationHeight"], 77);
        assert!(json["additionalRegisters"].as_object().unwrap().is_empty());
    }

    #[test]
    fn unsigned_tx_has_empty_data_inputs() {
        let tx = UnsignedTransaction::new(vec![], vec![]);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["dataInputs"], serde_json::json!([]));
    }

    #[test]
    fn totals_detect_overflow() {
        let big = UnspentOutput::new("a", u64::MAX, TREE, vec![], 1).unwrap();
        let tx = UnsignedTransaction::new(vec![big.clone(), big], vec![]);
        assert_eq!(tx.total_input_value(), None);
        assert_eq!(tx.total_output_value(), Some(0));
    }

    #[test]
    fn merge_sums_repeated_tokens() {
        let mut acc = vec![TokenAmount::new("a", 1).unwrap()];
        merge_tokens(
            &mut acc,
            &[
                TokenAmount::new("b", 5).unwrap(),
                TokenAmount::new("a", 2).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(
            acc,
            vec![
                TokenAmount::new("a", 3).unwrap(),
                TokenAmount::new("b", 5).unwrap()
            ]
        );
    }

    #[test]
    fn signed_tx_exposes_id() {
        let signed = SignedTransaction(serde_json::json!({"id": "abc", "inputs": []}));
        assert_eq!(signed.id(), Some("abc"));
        assert_eq!(SignedTransaction(serde_json::json!({})).id(), None);
    }
}
