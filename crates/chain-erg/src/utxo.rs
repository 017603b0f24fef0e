use tracing::debug;

use crate::ergo_box::{merge_tokens, TokenAmount, UnspentOutput};
use crate::error::ErgError;

/// Result of box selection: the chosen boxes, their aggregate value and the
/// tokens they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoSelection {
    /// The selected boxes, largest first.
    pub selected: Vec<UnspentOutput>,
    /// Total value of the selected boxes in nanoERG.
    pub total_value: u64,
    /// Per-token totals across the selected boxes, in first-seen order.
    pub tokens: Vec<TokenAmount>,
}

/// Select boxes to cover `required` nanoERG.
///
/// Uses largest-first selection. Boxes of equal value keep their relative
/// order, and selection stops at the first box that brings the total to
/// `required`.
pub fn select_utxos(utxos: &[UnspentOutput], required: u64) -> Result<UtxoSelection, ErgError> {
    // Stable sort by value descending (largest first).
    let mut sorted: Vec<&UnspentOutput> = utxos.iter().collect();
    sorted.sort_by(|a, b| b.value.cmp(&a.value));

    let mut selected: Vec<UnspentOutput> = Vec::new();
    let mut tokens: Vec<TokenAmount> = Vec::new();
    let mut total_value: u64 = 0;

    for utxo in sorted {
        total_value = total_value
            .checked_add(utxo.value)
            .ok_or_else(|| ErgError::AmountOverflow("selected input total".into()))?;
        merge_tokens(&mut tokens, &utxo.assets)?;
        selected.push(utxo.clone());

        if total_value >= required {
            debug!(
                inputs = selected.len(),
                total_value,
                required,
                tokens = tokens.len(),
                "selected inputs"
            );
            return Ok(UtxoSelection {
                selected,
                total_value,
                tokens,
            });
        }
    }

    Err(ErgError::InsufficientFunds {
        required,
        available: total_value,
    })
}
