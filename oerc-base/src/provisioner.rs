use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tracing::{info, instrument, warn};

use oerc_core::{
    timeout::{backend_timeout, bounded},
    Activity, CustodialBackend, Identity, Notice, Notifier, ValidationError, WalletError,
    WalletResult,
};

use crate::{AccountSync, Session};

/// Asks the backend to create a custodial wallet for the active identity and
/// adopts the returned address.
#[derive(Debug)]
pub struct WalletProvisioner {
    backend: Arc<dyn CustodialBackend>,
    session: Arc<Session>,
    sync: Arc<AccountSync>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    busy: AtomicBool,
}

/// Clears the busy flag when dropped.
struct Busy<'a>(&'a AtomicBool);

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl WalletProvisioner {
    /// Create a new WalletProvisioner.
    pub fn new(
        backend: Arc<dyn CustodialBackend>,
        session: Arc<Session>,
        sync: Arc<AccountSync>,
        notifier: Arc<dyn Notifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            session,
            sync,
            notifier,
            timeout,
            busy: AtomicBool::new(false),
        }
    }

    /// Create a wallet for `username`, which must be the active identity and
    /// must not have a wallet yet.
    ///
    /// On success the updated identity is persisted and the account view is
    /// rebuilt for the new address. On failure the identity is unchanged.
    #[instrument(skip(self))]
    pub async fn generate(&self, username: &str) -> WalletResult<Identity> {
        let identity = self.session.require()?;
        if identity.username != username {
            return Err(WalletError::NotAuthenticated);
        }
        if identity.has_wallet() {
            return Err(ValidationError::WalletAlreadyProvisioned.into());
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(WalletError::ProvisioningInFlight);
        }
        let _busy = Busy(&self.busy);

        self.notifier.notify(Notice::Busy(Activity::WalletGeneration));
        let result = self.provision(&identity).await;
        self.notifier.notify(Notice::Done(Activity::WalletGeneration));

        match result {
            Ok(updated) => {
                let address = updated.address().unwrap_or_default().to_owned();
                info!(%address, "Wallet created");
                self.sync.rebuild(Some(&updated)).await;
                self.notifier.notify(Notice::WalletCreated { address });
                Ok(updated)
            }
            Err(err) => {
                warn!(error = %err, "Wallet generation failed");
                self.notifier
                    .notify(Notice::WalletFailed(err.user_message()));
                Err(err)
            }
        }
    }

    async fn provision(&self, identity: &Identity) -> WalletResult<Identity> {
        let address = bounded(
            self.timeout,
            self.backend.generate_wallet(&identity.username),
            backend_timeout,
        )
        .await?;
        let address = address.trim();
        if address.is_empty() {
            return Err(WalletError::rejected(
                None,
                Some("the backend returned no wallet address".into()),
            ));
        }
        let updated = identity.with_address(address);
        self.session.update(&identity.username, updated.clone())?;
        Ok(updated)
    }

    /// True while a wallet is being generated.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}
