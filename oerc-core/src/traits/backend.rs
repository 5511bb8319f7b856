use std::fmt::Debug;

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::{Identity, Transaction, TransferReceipt, TransferRequest, ValidationError, WalletResult};

/// Username and password as submitted to `/login` and `/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Credentials with surrounding whitespace removed from the username.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_owned(),
            password: password.into(),
        }
    }

    /// Both fields must be filled in.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The indexed transaction feed.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait HistoryReader: Send + Sync + Debug {
    /// Transactions involving `address`, in the order the indexer returns
    /// them. An account without transactions yields `Ok(vec![])`; transport
    /// failures yield `BackendUnavailable`, so the two are never confused.
    async fn get_transactions(&self, address: &str) -> WalletResult<Vec<Transaction>>;
}

/// The custodial backend: authentication, wallet custody and transfer
/// execution.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait CustodialBackend: Send + Sync + Debug {
    /// Create an account.
    async fn register(&self, credentials: &Credentials) -> WalletResult<()>;

    /// Authenticate and return the account's identity.
    async fn login(&self, credentials: &Credentials) -> WalletResult<Identity>;

    /// Generate a custodial wallet for `username` and return its address.
    async fn generate_wallet(&self, username: &str) -> WalletResult<String>;

    /// Execute a transfer from the custodial wallet.
    async fn transfer(&self, request: &TransferRequest) -> WalletResult<TransferReceipt>;
}
