use tracing::debug;

use crate::ergo_box::{TransactionOutput, UnsignedTransaction, UnspentOutput};
use crate::error::ErgError;
use crate::utxo::select_utxos;

/// Everything the builder needs besides the wallet's boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationParams {
    /// Value sent to the donation address, in nanoERG.
    pub donation_value: u64,
    /// Value paid to the miner fee contract, in nanoERG.
    pub fee_value: u64,
    /// Chain height stamped on every output.
    pub current_height: u32,
    /// The wallet's own tree; receives the change.
    pub sender_tree: String,
    pub donation_tree: String,
    pub fee_tree: String,
    /// Floor for any output that carries tokens.
    pub min_box_value: u64,
}

/// Figures reported back to the user once a build succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub token_count: usize,
    pub change_value: u64,
    pub fee_value: u64,
    pub total_input_value: u64,
    pub input_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub tx: UnsignedTransaction,
    pub summary: BuildSummary,
}

/// Build an unsigned donation transaction.
///
/// Outputs are, in order: the donation, the miner fee, and a change box back
/// to the sender when there is change or any selected token. Total output
/// value always equals total input value.
///
/// A change box that carries tokens must hold at least `min_box_value`. When
/// the first selection leaves less than that, selection is repeated with the
/// floor added to the requirement so the change box is funded by real inputs.
pub fn build_donation_tx(
    params: &DonationParams,
    utxos: &[UnspentOutput],
) -> Result<BuildResult, ErgError> {
    if params.donation_value == 0 {
        return Err(ErgError::InvalidAmount("donation must be positive".into()));
    }
    if params.fee_value == 0 {
        return Err(ErgError::InvalidAmount("fee must be positive".into()));
    }

    let required = params
        .donation_value
        .checked_add(params.fee_value)
        .ok_or_else(|| ErgError::AmountOverflow("donation plus fee".into()))?;

    let mut selection = select_utxos(utxos, required)?;

    if params.donation_tree == params.sender_tree {
        return Err(ErgError::SelfDonationRejected);
    }

    let mut change = change_after(selection.total_value, required)?;

    let floor = params.min_box_value.max(1);
    if !selection.tokens.is_empty() && change < floor {
        let raised = required
            .checked_add(floor)
            .ok_or_else(|| ErgError::AmountOverflow("requirement with change floor".into()))?;
        debug!(change, floor, raised, "token change below box floor, selecting again");
        selection = select_utxos(utxos, raised)?;
        change = change_after(selection.total_value, required)?;
    }

    let height = params.current_height;
    let mut outputs = vec![
        TransactionOutput::new(params.donation_value, params.donation_tree.as_str(), vec![], height)?,
        TransactionOutput::new(params.fee_value, params.fee_tree.as_str(), vec![], height)?,
    ];

    let token_count = selection.tokens.len();
    if change > 0 || token_count > 0 {
        outputs.push(TransactionOutput::new(
            change,
            params.sender_tree.as_str(),
            selection.tokens,
            height,
        )?);
    }

    let summary = BuildSummary {
        token_count,
        change_value: change,
        fee_value: params.fee_value,
        total_input_value: selection.total_value,
        input_count: selection.selected.len(),
    };

    debug!(?summary, outputs = outputs.len(), "built donation transaction");

    Ok(BuildResult {
        tx: UnsignedTransaction::new(selection.selected, outputs),
        summary,
    })
}

fn change_after(total_input: u64, required: u64) -> Result<u64, ErgError> {
    total_input.checked_sub(required).ok_or_else(|| {
        ErgError::InvariantViolation(format!(
            "selected {total_input} nanoERG does not cover {required}"
        ))
    })
}
