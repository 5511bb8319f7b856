use std::{collections::VecDeque, fmt};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use oerc_core::{
    BalanceReader, Credentials, CustodialBackend, HistoryReader, Identity, Transaction,
    TransferReceipt, TransferRequest, WalletError, WalletResult,
};

enum Step<T> {
    Ready(WalletResult<T>),
    Gated(oneshot::Receiver<WalletResult<T>>),
}

/// A queue of scripted responses for one capability. Each call records its
/// key and takes the next step; gated steps only resolve once the test sends
/// the result, which lets tests control completion order.
pub struct Script<T> {
    calls: Mutex<Vec<String>>,
    steps: Mutex<VecDeque<Step<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            steps: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> fmt::Debug for Script<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("calls", &self.calls.lock().len())
            .field("queued", &self.steps.lock().len())
            .finish()
    }
}

impl<T> Script<T> {
    /// Queue an immediate result.
    pub fn push(&self, result: WalletResult<T>) {
        self.steps.lock().push_back(Step::Ready(result));
    }

    /// Queue a result that is held back until the returned sender fires.
    pub fn push_gated(&self) -> oneshot::Sender<WalletResult<T>> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().push_back(Step::Gated(rx));
        tx
    }

    /// Keys of every call so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Record a call and resolve the next scripted step.
    pub async fn next(&self, key: &str) -> WalletResult<T> {
        self.calls.lock().push(key.to_owned());
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Ready(result)) => result,
            Some(Step::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(WalletError::BackendUnavailable("gate dropped".into()))),
            None => Err(WalletError::BackendUnavailable(format!(
                "no scripted response for {key}"
            ))),
        }
    }
}

/// BalanceReader driven by a [`Script`].
#[derive(Debug, Default)]
pub struct ScriptedBalanceReader {
    /// Responses, keyed by address
    pub script: Script<String>,
}

#[async_trait]
impl BalanceReader for ScriptedBalanceReader {
    async fn get_balance(&self, address: &str) -> WalletResult<String> {
        self.script.next(address).await
    }
}

/// HistoryReader driven by a [`Script`].
#[derive(Debug, Default)]
pub struct ScriptedHistoryReader {
    /// Responses, keyed by address
    pub script: Script<Vec<Transaction>>,
}

#[async_trait]
impl HistoryReader for ScriptedHistoryReader {
    async fn get_transactions(&self, address: &str) -> WalletResult<Vec<Transaction>> {
        self.script.next(address).await
    }
}

/// CustodialBackend driven by one [`Script`] per endpoint.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    /// `/register`, keyed by username
    pub registrations: Script<()>,
    /// `/login`, keyed by username
    pub logins: Script<Identity>,
    /// `/generate-wallet`, keyed by username
    pub wallets: Script<String>,
    /// `/transfer`, keyed by `"<to>:<amount>"`
    pub transfers: Script<TransferReceipt>,
}

#[async_trait]
impl CustodialBackend for ScriptedBackend {
    async fn register(&self, credentials: &Credentials) -> WalletResult<()> {
        self.registrations.next(&credentials.username).await
    }

    async fn login(&self, credentials: &Credentials) -> WalletResult<Identity> {
        self.logins.next(&credentials.username).await
    }

    async fn generate_wallet(&self, username: &str) -> WalletResult<String> {
        self.wallets.next(username).await
    }

    async fn transfer(&self, request: &TransferRequest) -> WalletResult<TransferReceipt> {
        let key = format!("{}:{}", request.to_address, request.amount);
        self.transfers.next(&key).await
    }
}

/// A transaction with the given endpoints and a raw value of `value`.
pub fn dummy_transaction(hash: &str, from: &str, to: &str, value: u64) -> Transaction {
    Transaction {
        hash: hash.to_owned(),
        from: from.to_owned(),
        to: to.to_owned(),
        raw_value: value.into(),
        decimals: oerc_core::TOKEN_DECIMALS,
        symbol: oerc_core::TOKEN_SYMBOL.to_owned(),
        timestamp: oerc_core::UNKNOWN_TIMESTAMP.to_owned(),
        explorer_url: format!("https://sepolia.etherscan.io/tx/{hash}"),
    }
}
