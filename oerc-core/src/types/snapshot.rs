use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Transaction;

/// Balance shown before the first successful read.
pub const DEFAULT_BALANCE: &str = "0";

/// Overall refresh state of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// Nothing in flight and the last refresh fully succeeded (or none ran)
    #[default]
    Idle,
    /// At least one refresh is in flight
    Refreshing,
    /// The last applied refresh failed for at least one field
    Error,
}

/// Outcome of the most recent applied read for one field of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchStatus {
    /// No read has been applied yet
    #[default]
    NotFetched,
    /// The last applied read succeeded
    Fetched,
    /// The last applied read failed; the field kept its previous value
    Failed(String),
}

impl FetchStatus {
    /// True if the last applied read failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchStatus::Failed(_))
    }
}

/// The reconciled view of one account: balance and transaction list, each
/// with the status of its latest applied read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Address the snapshot describes; absent when no wallet is active
    pub address: Option<String>,
    /// Human readable balance
    pub balance: String,
    /// Transactions in the order the backend returned them
    pub transactions: Vec<Transaction>,
    /// Status of the balance field
    pub balance_status: FetchStatus,
    /// Status of the transaction list
    pub history_status: FetchStatus,
    /// When the last refresh was applied
    pub fetched_at: Option<DateTime<Utc>>,
    /// Overall state
    pub state: SyncState,
}

impl Default for AccountSnapshot {
    fn default() -> Self {
        Self {
            address: None,
            balance: DEFAULT_BALANCE.to_owned(),
            transactions: Vec::new(),
            balance_status: FetchStatus::NotFetched,
            history_status: FetchStatus::NotFetched,
            fetched_at: None,
            state: SyncState::Idle,
        }
    }
}

impl AccountSnapshot {
    /// An empty snapshot bound to `address`.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// True while a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.state == SyncState::Refreshing
    }

    /// True when the backend reported that the account has no transactions,
    /// as opposed to the list being empty because it could not be read.
    pub fn has_no_transactions(&self) -> bool {
        self.history_status == FetchStatus::Fetched && self.transactions.is_empty()
    }

    /// The state implied by the two field statuses once nothing is in flight.
    pub fn settled_state(&self) -> SyncState {
        if self.balance_status.is_failed() || self.history_status.is_failed() {
            SyncState::Error
        } else {
            SyncState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_empty() {
        let snapshot = AccountSnapshot::default();
        assert_eq!(snapshot.balance, "0");
        assert!(snapshot.transactions.is_empty());
        assert!(!snapshot.has_no_transactions());
        assert_eq!(snapshot.settled_state(), SyncState::Idle);
    }

    #[test]
    fn empty_history_is_distinguished_from_failure() {
        let mut snapshot = AccountSnapshot::for_address("0xabc");
        snapshot.history_status = FetchStatus::Fetched;
        assert!(snapshot.has_no_transactions());

        snapshot.history_status = FetchStatus::Failed("backend unavailable".into());
        assert!(!snapshot.has_no_transactions());
        assert_eq!(snapshot.settled_state(), SyncState::Error);
    }
}
