//! Post-build sanity checks for donation transactions.
//!
//! `validate` never fails: every problem found, including arithmetic
//! overflow, is collected into the report and all checks always run.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ergo_box::{merge_tokens, TokenAmount, UnsignedTransaction};

/// What a donation transaction is expected to pay and to whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    pub donation_tree: String,
    pub fee_tree: String,
    pub min_fee: u64,
    pub min_box_value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("transaction has no inputs")]
    NoInputs,

    #[error("inputs total {inputs} nanoERG but outputs total {outputs}")]
    BalanceMismatch { inputs: u64, outputs: u64 },

    #[error("{0} total overflows")]
    ValueOverflow(String),

    #[error("no fee output worth at least {min_fee} nanoERG")]
    MissingFeeOutput { min_fee: u64 },

    #[error("no output pays the donation address")]
    MissingDonationOutput,

    #[error("output {output} has an empty script")]
    EmptyScript { output: usize },

    #[error("token {token_id}: inputs carry {inputs}, outputs carry {outputs}")]
    TokenMismatch {
        token_id: String,
        inputs: u64,
        outputs: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationWarning {
    #[error("output {output} carries tokens with {value} nanoERG, below {min}")]
    TokenBoxBelowMinimum { output: usize, value: u64, min: u64 },

    #[error("outputs use different creation heights")]
    MixedCreationHeights,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Check `tx` against the donation expectations in `ctx`.
pub fn validate(tx: &UnsignedTransaction, ctx: &ValidationContext) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if tx.inputs.is_empty() {
        errors.push(ValidationError::NoInputs);
    }

    match (tx.total_input_value(), tx.total_output_value()) {
        (Some(inputs), Some(outputs)) if inputs != outputs => {
            errors.push(ValidationError::BalanceMismatch { inputs, outputs });
        }
        (Some(_), Some(_)) => {}
        (None, _) => errors.push(ValidationError::ValueOverflow("input".into())),
        (_, None) => errors.push(ValidationError::ValueOverflow("output".into())),
    }

    let has_fee = tx
        .outputs
        .iter()
        .any(|o| o.ergo_tree == ctx.fee_tree && o.value >= ctx.min_fee);
    if !has_fee {
        errors.push(ValidationError::MissingFeeOutput {
            min_fee: ctx.min_fee,
        });
    }

    if !tx.outputs.iter().any(|o| o.ergo_tree == ctx.donation_tree) {
        errors.push(ValidationError::MissingDonationOutput);
    }

    for (output, o) in tx.outputs.iter().enumerate() {
        if o.ergo_tree.is_empty() {
            errors.push(ValidationError::EmptyScript { output });
        }
    }

    check_tokens(tx, &mut errors);

    for (output, o) in tx.outputs.iter().enumerate() {
        if !o.assets.is_empty() && o.value < ctx.min_box_value {
            warnings.push(ValidationWarning::TokenBoxBelowMinimum {
                output,
                value: o.value,
                min: ctx.min_box_value,
            });
        }
    }

    if let Some(first) = tx.outputs.first() {
        if tx
            .outputs
            .iter()
            .any(|o| o.creation_height != first.creation_height)
        {
            warnings.push(ValidationWarning::MixedCreationHeights);
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_tokens(tx: &UnsignedTransaction, errors: &mut Vec<ValidationError>) {
    let input_tokens = match totals(tx.inputs.iter().map(|i| i.assets.as_slice())) {
        Some(t) => t,
        None => {
            errors.push(ValidationError::ValueOverflow("input token".into()));
            return;
        }
    };
    let output_tokens = match totals(tx.outputs.iter().map(|o| o.assets.as_slice())) {
        Some(t) => t,
        None => {
            errors.push(ValidationError::ValueOverflow("output token".into()));
            return;
        }
    };

    let mut ids: Vec<&String> = input_tokens.keys().chain(output_tokens.keys()).collect();
    ids.sort();
    ids.dedup();

    for id in ids {
        let inputs = input_tokens.get(id).copied().unwrap_or(0);
        let outputs = output_tokens.get(id).copied().unwrap_or(0);
        if inputs != outputs {
            errors.push(ValidationError::TokenMismatch {
                token_id: id.clone(),
                inputs,
                outputs,
            });
        }
    }
}

fn totals<'a>(lists: impl Iterator<Item = &'a [TokenAmount]>) -> Option<BTreeMap<String, u64>> {
    let mut merged = Vec::new();
    for tokens in lists {
        merge_tokens(&mut merged, tokens).ok()?;
    }
    Some(merged.into_iter().map(|t| (t.token_id, t.amount)).collect())
}
