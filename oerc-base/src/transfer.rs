use std::{collections::HashSet, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use oerc_core::{
    timeout::{backend_timeout, bounded},
    Activity, Confirmation, CustodialBackend, Notice, Notifier, TransferForm, TransferOutcome,
    UserPrompt, WalletError, WalletResult, GENERIC_TRANSFER_FAILURE,
};

use crate::{AccountSync, Session};

/// Drives a transfer from the form to the backend and back to the account
/// view: validate, confirm, submit, then refresh the sender's account once.
///
/// At most one transfer per identity is processed at a time. Failed
/// submissions are never retried; the form is kept so the user can retry.
#[derive(Debug)]
pub struct TransferOrchestrator {
    backend: Arc<dyn CustodialBackend>,
    session: Arc<Session>,
    sync: Arc<AccountSync>,
    prompt: Arc<dyn UserPrompt>,
    notifier: Arc<dyn Notifier>,
    symbol: String,
    timeout: Duration,
    pending: Mutex<HashSet<String>>,
}

/// Marks a username as having a transfer in flight until dropped.
struct PendingTransfer<'a> {
    pending: &'a Mutex<HashSet<String>>,
    username: String,
}

impl Drop for PendingTransfer<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.username);
    }
}

impl TransferOrchestrator {
    /// Create a new TransferOrchestrator.
    pub fn new(
        backend: Arc<dyn CustodialBackend>,
        session: Arc<Session>,
        sync: Arc<AccountSync>,
        prompt: Arc<dyn UserPrompt>,
        notifier: Arc<dyn Notifier>,
        symbol: String,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            session,
            sync,
            prompt,
            notifier,
            symbol,
            timeout,
            pending: Mutex::new(HashSet::new()),
        }
    }

    fn begin(&self, username: &str) -> WalletResult<PendingTransfer<'_>> {
        if !self.pending.lock().insert(username.to_owned()) {
            return Err(WalletError::TransferInFlight);
        }
        Ok(PendingTransfer {
            pending: &self.pending,
            username: username.to_owned(),
        })
    }

    /// Refresh the sender's account, unless the user signed out or switched
    /// accounts while the transfer was in flight.
    async fn refresh_sender(&self, username: &str, address: &str, epoch: u64) {
        let still_active = self
            .session
            .current()
            .is_some_and(|active| active.username == username && active.address() == Some(address));
        if !still_active {
            info!(username, "Sender is no longer signed in, not refreshing");
            return;
        }
        self.sync.refresh_unless_reset(address, epoch, false).await;
    }

    /// True while a transfer for `username` is being processed.
    pub fn is_pending(&self, username: &str) -> bool {
        self.pending.lock().contains(username)
    }

    /// Transfer `amount` from `from_username` to `to_address`.
    /// `from_username` must be the active identity.
    pub async fn submit(
        &self,
        from_username: &str,
        to_address: &str,
        amount: &str,
    ) -> WalletResult<TransferOutcome> {
        match self.session.current() {
            Some(identity) if identity.username == from_username => {}
            _ => return Err(WalletError::NotAuthenticated),
        }
        let mut form = TransferForm::new(to_address, amount);
        self.submit_form(&mut form).await
    }

    /// Submit the transfer described by `form` on behalf of the active
    /// identity. The form is cleared only once the backend has accepted the
    /// transfer.
    #[instrument(skip(self, form), fields(to = %form.to, amount = %form.amount))]
    pub async fn submit_form(&self, form: &mut TransferForm) -> WalletResult<TransferOutcome> {
        let identity = self.session.require()?;
        let address = identity
            .address()
            .map(str::to_owned)
            .ok_or(WalletError::MissingWallet)?;

        let request = match form.to_request(&identity.username) {
            Ok(request) => request,
            Err(err) => {
                self.notifier.notify(Notice::Incomplete(err.clone()));
                return Err(err.into());
            }
        };

        let _pending = self.begin(&identity.username)?;

        let confirmation = Confirmation {
            to_address: request.to_address.clone(),
            amount: request.amount.clone(),
            symbol: self.symbol.clone(),
        };
        if !self.prompt.confirm(&confirmation).await {
            info!("Transfer cancelled");
            return Ok(TransferOutcome::Cancelled);
        }

        let epoch = self.sync.epoch();
        self.notifier.notify(Notice::Busy(Activity::Transfer));
        let result = bounded(
            self.timeout,
            self.backend.transfer(&request),
            backend_timeout,
        )
        .await;
        self.notifier.notify(Notice::Done(Activity::Transfer));

        match result {
            Ok(receipt) => {
                info!(hash = %receipt.hash, "Transfer submitted");
                form.clear();
                self.notifier.notify(Notice::TransferSubmitted {
                    hash: receipt.hash.clone(),
                });
                self.refresh_sender(&identity.username, &address, epoch).await;
                Ok(TransferOutcome::Submitted(receipt))
            }
            Err(err) => {
                warn!(error = %err, "Transfer failed");
                let message = err
                    .backend_message()
                    .unwrap_or(GENERIC_TRANSFER_FAILURE)
                    .to_owned();
                self.notifier.notify(Notice::TransferFailed(message));
                Err(err)
            }
        }
    }
}
