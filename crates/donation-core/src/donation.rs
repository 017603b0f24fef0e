use chain_erg::{
    build_donation_tx, validate, BuildSummary, DonationParams, ErgError, ValidationWarning,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::amount::format_erg;
use crate::config::DonationConfig;
use crate::error::DonationError;
use crate::session::{CancelToken, WalletSession};
use crate::wallet::WalletProvider;

/// Progress of a donation, in the order it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationStatus {
    Connecting,
    Connected { balance: u64 },
    FetchingWalletData,
    Building { amount: u64 },
    Validating,
    AwaitingSignature,
    Submitting,
    Submitted { tx_id: String, explorer_link: String },
    Failed { message: String },
}

impl DonationStatus {
    /// Status line for the donation modal.
    pub fn message(&self) -> String {
        match self {
            DonationStatus::Connecting => "Connecting to wallet...".into(),
            DonationStatus::Connected { balance } => {
                format!("Wallet connected. Balance: {} ERG", format_erg(*balance))
            }
            DonationStatus::FetchingWalletData => "Fetching wallet data...".into(),
            DonationStatus::Building { amount } => {
                format!("Building transaction for {} ERG...", format_erg(*amount))
            }
            DonationStatus::Validating => "Checking transaction...".into(),
            DonationStatus::AwaitingSignature => "Please sign the transaction in your wallet.".into(),
            DonationStatus::Submitting => "Submitting transaction...".into(),
            DonationStatus::Submitted { explorer_link, .. } => {
                format!("Thank you! View your donation: {explorer_link}")
            }
            DonationStatus::Failed { message } => message.clone(),
        }
    }
}

/// Forwards status updates to the UI, if anyone is listening.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    sender: Option<mpsc::UnboundedSender<DonationStatus>>,
}

impl StatusReporter {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DonationStatus>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            StatusReporter {
                sender: Some(sender),
            },
            receiver,
        )
    }

    fn report(&self, status: DonationStatus) {
        info!(status = %status.message(), "donation status");
        if let Some(sender) = &self.sender {
            // The UI going away must not abort the donation.
            let _ = sender.send(status);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationReceipt {
    pub tx_id: String,
    pub explorer_link: String,
    pub summary: BuildSummary,
    pub warnings: Vec<ValidationWarning>,
}

/// Run one donation of `amount` nanoERG end to end: connect, fetch, build,
/// validate, sign, submit.
///
/// Any failure aborts the flow, is reported once as
/// [`DonationStatus::Failed`] and is returned unchanged.
pub async fn process_donation(
    session: &mut WalletSession,
    provider: &dyn WalletProvider,
    config: &DonationConfig,
    amount: u64,
    cancel: &CancelToken,
    reporter: &StatusReporter,
) -> Result<DonationReceipt, DonationError> {
    let result = run_donation(session, provider, config, amount, cancel, reporter).await;
    if let Err(e) = &result {
        warn!(error = %e, "donation failed");
        reporter.report(DonationStatus::Failed {
            message: e.user_message(),
        });
    }
    result
}

async fn run_donation(
    session: &mut WalletSession,
    provider: &dyn WalletProvider,
    config: &DonationConfig,
    amount: u64,
    cancel: &CancelToken,
    reporter: &StatusReporter,
) -> Result<DonationReceipt, DonationError> {
    config.validate()?;
    if amount < config.min_donation {
        return Err(DonationError::InvalidAmount(format!(
            "minimum donation is {} ERG",
            format_erg(config.min_donation)
        )));
    }

    reporter.report(DonationStatus::Connecting);
    session.connect(provider, cancel).await?;
    let balance = session.balance(cancel).await?;
    reporter.report(DonationStatus::Connected { balance });

    reporter.report(DonationStatus::FetchingWalletData);
    let current_height = session.current_height(cancel).await?;
    let utxos = session.utxos(cancel).await?;

    let sender_tree = match utxos.first() {
        Some(utxo) => utxo.ergo_tree.clone(),
        None => {
            return Err(ErgError::InsufficientFunds {
                required: amount.saturating_add(config.fee),
                available: 0,
            }
            .into())
        }
    };
    let donation_tree = config.address_resolver().resolve(&config.donation_address)?;

    reporter.report(DonationStatus::Building { amount });
    let params = DonationParams {
        donation_value: amount,
        fee_value: config.fee,
        current_height,
        sender_tree,
        donation_tree: donation_tree.clone(),
        fee_tree: config.fee_tree.clone(),
        min_box_value: config.min_box_value,
    };
    let built = build_donation_tx(&params, &utxos)?;

    reporter.report(DonationStatus::Validating);
    let report = validate(&built.tx, &config.validation_context(donation_tree));
    for warning in &report.warnings {
        warn!(%warning, "donation transaction warning");
    }
    if !report.valid {
        return Err(DonationError::ValidationFailed(report.errors));
    }

    reporter.report(DonationStatus::AwaitingSignature);
    let signed = session.sign(&built.tx, cancel).await?;

    reporter.report(DonationStatus::Submitting);
    let tx_id = session.submit(&signed, cancel).await?;
    let explorer_link = config.network.transaction_link(&tx_id);

    info!(%tx_id, inputs = built.summary.input_count, "donation submitted");
    reporter.report(DonationStatus::Submitted {
        tx_id: tx_id.clone(),
        explorer_link: explorer_link.clone(),
    });

    Ok(DonationReceipt {
        tx_id,
        explorer_link,
        summary: built.summary,
        warnings: report.warnings,
    })
}
