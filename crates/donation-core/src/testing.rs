//! Scriptable wallet doubles for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chain_erg::{SignedTransaction, TokenAmount, UnsignedTransaction, UnspentOutput};
use tracing_subscriber::EnvFilter;

use crate::wallet::{WalletApi, WalletApiError, WalletProvider};

pub const SENDER_TREE: &str =
    "0008cd02a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7";

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("donation_core=debug,chain_erg=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// What a mocked call does when awaited.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Err(WalletApiError),
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> Result<T, WalletApiError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Err(e) => Err(e.clone()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub struct MockWallet {
    pub connect: Reply<bool>,
    pub balance: Reply<String>,
    pub height: Reply<u32>,
    pub utxos: Reply<Vec<UnspentOutput>>,
    pub sign: Reply<SignedTransaction>,
    pub submit: Reply<String>,
    pub signed: Mutex<Vec<UnsignedTransaction>>,
    pub connect_calls: AtomicU32,
}

impl MockWallet {
    /// A wallet holding one 5 ERG box and one 2 ERG box carrying a token.
    pub fn funded() -> Self {
        MockWallet {
            connect: Reply::Ok(true),
            balance: Reply::Ok("7000000000".into()),
            height: Reply::Ok(1_200_000),
            utxos: Reply::Ok(vec![
                UnspentOutput::new(
                    "box-small",
                    2_000_000_000,
                    SENDER_TREE,
                    vec![TokenAmount::new("token-1", 50).unwrap()],
                    1_100_000,
                )
                .unwrap(),
                UnspentOutput::new("box-large", 5_000_000_000, SENDER_TREE, vec![], 1_100_000)
                    .unwrap(),
            ]),
            sign: Reply::Ok(SignedTransaction(serde_json::json!({"id": "signed-tx"}))),
            submit: Reply::Ok("a1b2c3".into()),
            signed: Mutex::new(Vec::new()),
            connect_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl WalletApi for MockWallet {
    async fn connect(&self) -> Result<bool, WalletApiError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.connect.resolve().await
    }

    async fn get_balance(&self) -> Result<String, WalletApiError> {
        self.balance.resolve().await
    }

    async fn get_current_height(&self) -> Result<u32, WalletApiError> {
        self.height.resolve().await
    }

    async fn get_utxos(&self) -> Result<Vec<UnspentOutput>, WalletApiError> {
        self.utxos.resolve().await
    }

    async fn sign_tx(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, WalletApiError> {
        self.signed.lock().unwrap().push(tx.clone());
        self.sign.resolve().await
    }

    async fn submit_tx(&self, _tx: &SignedTransaction) -> Result<String, WalletApiError> {
        self.submit.resolve().await
    }
}

/// Provider whose wallet shows up after a number of polls.
pub struct MockProvider {
    pub wallet: Option<Arc<MockWallet>>,
    pub appears_after: u32,
    pub polls: AtomicU32,
}

impl MockProvider {
    pub fn with(wallet: Arc<MockWallet>) -> Self {
        MockProvider {
            wallet: Some(wallet),
            appears_after: 0,
            polls: AtomicU32::new(0),
        }
    }

    pub fn empty() -> Self {
        MockProvider {
            wallet: None,
            appears_after: 0,
            polls: AtomicU32::new(0),
        }
    }
}

impl WalletProvider for MockProvider {
    fn injected_api(&self) -> Option<Arc<dyn WalletApi>> {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst);
        if seen < self.appears_after {
            return None;
        }
        self.wallet.clone().map(|w| w as Arc<dyn WalletApi>)
    }
}
