use std::{future::Future, time::Duration};

use crate::{WalletError, WalletResult};

/// Wait for `fut` at most `limit`; on expiry resolve to the error built by
/// `on_elapsed` instead of hanging.
pub async fn bounded<T, F>(
    limit: Duration,
    fut: F,
    on_elapsed: impl FnOnce(Duration) -> WalletError,
) -> WalletResult<T>
where
    F: Future<Output = WalletResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_elapsed(limit)),
    }
}

/// `ChainUnavailable` describing a timed out chain read.
pub fn chain_timeout(limit: Duration) -> WalletError {
    WalletError::ChainUnavailable(format!("timed out after {limit:?}"))
}

/// `BackendUnavailable` describing a timed out backend call.
pub fn backend_timeout(limit: Duration) -> WalletError {
    WalletError::BackendUnavailable(format!("timed out after {limit:?}"))
}
