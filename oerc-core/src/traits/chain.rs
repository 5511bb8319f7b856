use std::fmt::Debug;

use async_trait::async_trait;
use auto_impl::auto_impl;

use crate::WalletResult;

/// Read-only access to the token contract on chain.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait BalanceReader: Send + Sync + Debug {
    /// Token balance of `address` at the current chain head, formatted as a
    /// decimal string. Fails with `ChainUnavailable` when the call cannot
    /// complete. Implementations do not retry.
    async fn get_balance(&self, address: &str) -> WalletResult<String>;
}
