use std::{collections::BTreeSet, sync::Arc, time::Duration};

use chrono::Utc;
use derive_new::new;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use oerc_core::{
    timeout::{backend_timeout, bounded, chain_timeout},
    AccountSnapshot, BalanceReader, FetchStatus, HistoryReader, Identity, Notice, Notifier,
    SyncState, Transaction, WalletResult,
};


/// Upper bounds on the two reads of a refresh.
#[derive(Debug, Clone, Copy, new)]
pub struct SyncTimeouts {
    /// Balance read against the chain
    pub chain: Duration,
    /// Transaction list read against the backend
    pub backend: Duration,
}

impl Default for SyncTimeouts {
    fn default() -> Self {
        Self {
            chain: Duration::from_secs(10),
            backend: Duration::from_secs(15),
        }
    }
}

/// What a call to [`AccountSync::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshReport {
    /// No wallet address; the snapshot was reset and nothing was read
    Skipped,
    /// The results arrived after a reset or an address change, or a newer
    /// refresh had already been applied to both fields; nothing changed
    Discarded,
    /// Results were applied; `None` means the field was read successfully
    Completed {
        /// Why the balance read failed
        balance_error: Option<String>,
        /// Why the transaction list read failed
        history_error: Option<String>,
    },
}

impl RefreshReport {
    /// True if both reads succeeded and were applied.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RefreshReport::Completed {
                balance_error: None,
                history_error: None
            }
        )
    }

    /// The first failure, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            RefreshReport::Completed {
                balance_error,
                history_error,
            } => balance_error.as_deref().or(history_error.as_deref()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct SyncInner {
    snapshot: AccountSnapshot,
    /// Last sequence number handed out
    issued: u64,
    /// Results with a sequence number at or below this are discarded
    floor: u64,
    /// Sequence number of the last read applied to each field
    balance_applied: u64,
    history_applied: u64,
    in_flight: BTreeSet<u64>,
    /// Number of resets so far
    epoch: u64,
}

impl SyncInner {
    /// Invalidate every refresh issued so far and start from an empty
    /// snapshot.
    fn reset(&mut self, snapshot: AccountSnapshot) {
        self.floor = self.issued;
        self.epoch += 1;
        self.in_flight.clear();
        self.snapshot = snapshot;
    }

    fn begin(&mut self, address: &str) -> u64 {
        if self.snapshot.address.as_deref() != Some(address) {
            self.reset(AccountSnapshot::for_address(address));
        }
        self.issued += 1;
        self.in_flight.insert(self.issued);
        self.snapshot.state = SyncState::Refreshing;
        self.issued
    }

    fn is_current(&self, seq: u64, address: &str) -> bool {
        seq > self.floor && self.snapshot.address.as_deref() == Some(address)
    }

    fn apply(
        &mut self,
        seq: u64,
        balance: WalletResult<String>,
        history: WalletResult<Vec<Transaction>>,
    ) -> RefreshReport {
        self.in_flight.remove(&seq);
        let mut applied = false;

        let balance_error = balance.as_ref().err().map(ToString::to_string);
        if seq > self.balance_applied {
            self.balance_applied = seq;
            applied = true;
            match balance {
                Ok(balance) => {
                    self.snapshot.balance = balance;
                    self.snapshot.balance_status = FetchStatus::Fetched;
                }
                Err(err) => self.snapshot.balance_status = FetchStatus::Failed(err.to_string()),
            }
        } else {
            debug!(seq, applied = self.balance_applied, "Ignoring stale balance");
        }

        let history_error = history.as_ref().err().map(ToString::to_string);
        if seq > self.history_applied {
            self.history_applied = seq;
            applied = true;
            match history {
                Ok(transactions) => {
                    self.snapshot.transactions = transactions;
                    self.snapshot.history_status = FetchStatus::Fetched;
                }
                Err(err) => self.snapshot.history_status = FetchStatus::Failed(err.to_string()),
            }
        } else {
            debug!(seq, applied = self.history_applied, "Ignoring stale transaction list");
        }

        if applied {
            self.snapshot.fetched_at = Some(Utc::now());
        }
        self.snapshot.state = if self.in_flight.is_empty() {
            self.snapshot.settled_state()
        } else {
            SyncState::Refreshing
        };

        if !applied {
            return RefreshReport::Discarded;
        }
        RefreshReport::Completed {
            balance_error,
            history_error,
        }
    }
}

/// Keeps the [`AccountSnapshot`] of the active wallet consistent with the
/// chain and the backend.
///
/// Every refresh reads the balance and the transaction list concurrently
/// and is tagged with a sequence number. A result is applied to a field only
/// if no newer refresh has already been applied to it, and only if no reset
/// (sign out, address change) happened since the refresh started. A failed
/// read keeps the previous value of its field.
#[derive(Debug)]
pub struct AccountSync {
    balances: Arc<dyn BalanceReader>,
    history: Arc<dyn HistoryReader>,
    notifier: Arc<dyn Notifier>,
    timeouts: SyncTimeouts,
    inner: Mutex<SyncInner>,
    snapshots: watch::Sender<AccountSnapshot>,
}

impl AccountSync {
    /// Create a new AccountSync.
    pub fn new(
        balances: Arc<dyn BalanceReader>,
        history: Arc<dyn HistoryReader>,
        notifier: Arc<dyn Notifier>,
        timeouts: SyncTimeouts,
    ) -> Self {
        let (snapshots, _) = watch::channel(AccountSnapshot::default());
        Self {
            balances,
            history,
            notifier,
            timeouts,
            inner: Mutex::new(SyncInner::default()),
            snapshots,
        }
    }

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> AccountSnapshot {
        self.inner.lock().snapshot.clone()
    }

    /// True while at least one refresh for the current address is in
    /// flight.
    pub fn is_refreshing(&self) -> bool {
        !self.inner.lock().in_flight.is_empty()
    }

    /// Receive every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<AccountSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self, snapshot: &AccountSnapshot) {
        self.snapshots.send_replace(snapshot.clone());
    }

    /// Drop the snapshot and invalidate every refresh in flight. Used on sign
    /// out; results that arrive afterwards are discarded.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.reset(AccountSnapshot::default());
        self.publish(&inner.snapshot);
    }

    /// Rebuild all derived state from `identity`: reset, then refresh if it
    /// has a wallet.
    pub async fn rebuild(&self, identity: Option<&Identity>) -> RefreshReport {
        self.reset();
        self.refresh(identity.and_then(Identity::address), false).await
    }

    /// Read the balance and transaction list of `address` and apply them to
    /// the snapshot.
    ///
    /// With no address the snapshot is reset and nothing is read. Both reads
    /// are bounded by the configured timeouts. When `notify_user` is set the
    /// outcome is also reported through the notifier, unless it was
    /// discarded.
    #[instrument(skip(self))]
    pub async fn refresh(&self, address: Option<&str>, notify_user: bool) -> RefreshReport {
        let Some(address) = address.map(str::trim).filter(|a| !a.is_empty()) else {
            self.reset();
            return RefreshReport::Skipped;
        };

        let seq = {
            let mut inner = self.inner.lock();
            let seq = inner.begin(address);
            self.publish(&inner.snapshot);
            seq
        };
        self.read_and_apply(seq, address, notify_user).await
    }

    /// Counts resets, including the implicit one when the shown account
    /// changes. Pass it to [`AccountSync::refresh_unless_reset`].
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Like [`AccountSync::refresh`], but does nothing if the snapshot was
    /// reset since `epoch` was read or now shows another account. For work
    /// that completes after the user may have signed out or switched
    /// accounts.
    #[instrument(skip(self))]
    pub async fn refresh_unless_reset(
        &self,
        address: &str,
        epoch: u64,
        notify_user: bool,
    ) -> RefreshReport {
        let address = address.trim();
        let seq = {
            let mut inner = self.inner.lock();
            let shown = inner.snapshot.address.as_deref();
            if inner.epoch != epoch || shown.is_some_and(|shown| shown != address) {
                debug!(epoch, current = inner.epoch, ?shown, "Snapshot was reset, not refreshing");
                return RefreshReport::Discarded;
            }
            let seq = inner.begin(address);
            self.publish(&inner.snapshot);
            seq
        };
        self.read_and_apply(seq, address, notify_user).await
    }

    async fn read_and_apply(&self, seq: u64, address: &str, notify_user: bool) -> RefreshReport {
        let (balance, history) = tokio::join!(
            bounded(
                self.timeouts.chain,
                self.balances.get_balance(address),
                chain_timeout
            ),
            bounded(
                self.timeouts.backend,
                self.history.get_transactions(address),
                backend_timeout
            ),
        );

        if let Err(err) = &balance {
            warn!(seq, error = %err, transient = err.is_transient(), "Failed to read balance");
        }
        if let Err(err) = &history {
            warn!(seq, error = %err, transient = err.is_transient(), "Failed to read transactions");
        }

        let report = {
            let mut inner = self.inner.lock();
            if !inner.is_current(seq, address) {
                debug!(seq, floor = inner.floor, "Discarding refresh issued before reset");
                return RefreshReport::Discarded;
            }
            let report = inner.apply(seq, balance, history);
            self.publish(&inner.snapshot);
            report
        };

        if notify_user {
            match &report {
                RefreshReport::Completed { .. } => match report.error() {
                    None => {
                        info!(seq, "Account refreshed");
                        self.notifier.notify(Notice::Updated);
                    }
                    Some(err) => self.notifier.notify(Notice::RefreshFailed(err.to_owned())),
                },
                _ => debug!(seq, "Refresh superseded by a newer one, not notifying"),
            }
        }

        report
    }
}
