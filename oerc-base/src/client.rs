use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use eyre::{Context, Result};
use tracing::{info, instrument, warn};

use oerc_core::{
    timeout::{backend_timeout, bounded},
    AccountSnapshot, BalanceReader, Credentials, CustodialBackend, HistoryReader, Identity,
    Notice, Notifier, SessionStore, TransferForm, TransferOutcome, UserPrompt, WalletResult,
};
use oerc_ethereum::EthereumBalanceReader;

use crate::{
    settings::Settings, AccountSync, LocalSessionStore, RefreshReport, RestBackend, Session,
    SyncTimeouts, TransferOrchestrator, WalletProvisioner,
};

/// The capabilities a [`WalletClient`] is assembled from.
#[derive(Debug, Clone)]
pub struct ClientParts {
    /// Reads token balances
    pub balances: Arc<dyn BalanceReader>,
    /// Reads the transaction feed
    pub history: Arc<dyn HistoryReader>,
    /// Authentication, wallet custody and transfers
    pub backend: Arc<dyn CustodialBackend>,
    /// Persists the active identity
    pub store: Arc<dyn SessionStore>,
    /// Asks the user to confirm transfers
    pub prompt: Arc<dyn UserPrompt>,
    /// Shows notices to the user
    pub notifier: Arc<dyn Notifier>,
}

/// Tunables of a [`WalletClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Token symbol shown in confirmations
    pub symbol: String,
    /// Bound on chain reads
    pub chain_timeout: Duration,
    /// Bound on backend calls
    pub backend_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        let timeouts = SyncTimeouts::default();
        Self {
            symbol: oerc_core::TOKEN_SYMBOL.to_owned(),
            chain_timeout: timeouts.chain,
            backend_timeout: timeouts.backend,
        }
    }
}

/// Entry point of the wallet client. Owns the session and wires the account
/// sync, the transfer orchestrator and the wallet provisioner to it.
#[derive(Debug)]
pub struct WalletClient {
    backend: Arc<dyn CustodialBackend>,
    notifier: Arc<dyn Notifier>,
    session: Arc<Session>,
    sync: Arc<AccountSync>,
    transfers: TransferOrchestrator,
    provisioner: WalletProvisioner,
    backend_timeout: Duration,
    started: AtomicBool,
}

impl WalletClient {
    /// Assemble a client from its capabilities.
    pub fn new(parts: ClientParts, options: ClientOptions) -> Self {
        let session = Arc::new(Session::new(parts.store));
        let sync = Arc::new(AccountSync::new(
            parts.balances,
            parts.history,
            parts.notifier.clone(),
            SyncTimeouts::new(options.chain_timeout, options.backend_timeout),
        ));
        let transfers = TransferOrchestrator::new(
            parts.backend.clone(),
            session.clone(),
            sync.clone(),
            parts.prompt,
            parts.notifier.clone(),
            options.symbol,
            options.backend_timeout,
        );
        let provisioner = WalletProvisioner::new(
            parts.backend.clone(),
            session.clone(),
            sync.clone(),
            parts.notifier.clone(),
            options.backend_timeout,
        );
        Self {
            backend: parts.backend,
            notifier: parts.notifier,
            session,
            sync,
            transfers,
            provisioner,
            backend_timeout: options.backend_timeout,
            started: AtomicBool::new(false),
        }
    }

    /// Build a client talking to the configured chain and backend.
    pub fn from_settings(
        settings: &Settings,
        prompt: Arc<dyn UserPrompt>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let balances = EthereumBalanceReader::from_conf(&settings.chain)
            .context("Failed to build the chain client")?;
        let rest = Arc::new(
            RestBackend::new(&settings.backend, &settings.explorer)
                .context("Failed to build the backend client")?,
        );
        let parts = ClientParts {
            balances: Arc::new(balances),
            history: rest.clone(),
            backend: rest,
            store: Arc::new(LocalSessionStore::new(settings.session.path.clone())),
            prompt,
            notifier,
        };
        let options = ClientOptions {
            symbol: settings.chain.symbol.clone(),
            chain_timeout: settings.chain.timeout(),
            backend_timeout: settings.backend.timeout(),
        };
        Ok(Self::new(parts, options))
    }

    /// Restore the persisted session without reading its account. Commands
    /// that do not show account state use this instead of
    /// [`WalletClient::start`].
    pub fn resume(&self) -> Option<Identity> {
        self.session.restore()
    }

    /// Restore the persisted session and sync its account. Runs once; later
    /// calls just return the active identity.
    pub async fn start(&self) -> Option<Identity> {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.session.current();
        }
        let identity = self.session.restore();
        self.sync.rebuild(identity.as_ref()).await;
        identity
    }

    /// Sign in and sync the account of the returned identity.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: Credentials) -> WalletResult<Identity> {
        credentials.validate()?;
        let result = bounded(
            self.backend_timeout,
            self.backend.login(&credentials),
            backend_timeout,
        )
        .await;
        let identity = match result {
            Ok(identity) => identity.normalized(),
            Err(err) => {
                warn!(error = %err, "Login failed");
                self.notifier.notify(Notice::AuthFailed(err.user_message()));
                return Err(err);
            }
        };
        let identity = if identity.username.trim().is_empty() {
            Identity {
                username: credentials.username.clone(),
                ..identity
            }
        } else {
            identity
        };

        self.session.set(identity.clone())?;
        info!(has_wallet = identity.has_wallet(), "Signed in");
        self.notifier.notify(Notice::Welcome {
            username: identity.username.clone(),
        });
        self.sync.rebuild(Some(&identity)).await;
        Ok(identity)
    }

    /// Create an account, then sign in with it.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn register(&self, credentials: Credentials) -> WalletResult<Identity> {
        credentials.validate()?;
        let result = bounded(
            self.backend_timeout,
            self.backend.register(&credentials),
            backend_timeout,
        )
        .await;
        if let Err(err) = result {
            warn!(error = %err, "Registration failed");
            self.notifier.notify(Notice::AuthFailed(err.user_message()));
            return Err(err);
        }
        info!("Registered");
        self.login(credentials).await
    }

    /// Sign out: erase the stored identity and drop the account view. Refreshes
    /// still in flight are discarded when they complete.
    pub fn logout(&self) -> WalletResult<()> {
        let result = self.session.end();
        self.sync.reset();
        info!("Signed out");
        result
    }

    /// User-requested refresh of the active account.
    pub async fn refresh(&self) -> RefreshReport {
        let identity = self.session.current();
        self.sync
            .refresh(identity.as_ref().and_then(Identity::address), true)
            .await
    }

    /// Submit the transfer form.
    pub async fn transfer(&self, form: &mut TransferForm) -> WalletResult<TransferOutcome> {
        self.transfers.submit_form(form).await
    }

    /// Create a wallet for the active identity.
    pub async fn generate_wallet(&self) -> WalletResult<Identity> {
        let identity = self.session.require()?;
        self.provisioner.generate(&identity.username).await
    }

    /// The active identity.
    pub fn identity(&self) -> Option<Identity> {
        self.session.current()
    }

    /// The current account view.
    pub fn snapshot(&self) -> AccountSnapshot {
        self.sync.snapshot()
    }

    /// The account sync, for subscribing to snapshot changes.
    pub fn account_sync(&self) -> &Arc<AccountSync> {
        &self.sync
    }

    /// The transfer orchestrator.
    pub fn transfers(&self) -> &TransferOrchestrator {
        &self.transfers
    }

    /// The wallet provisioner.
    pub fn provisioner(&self) -> &WalletProvisioner {
        &self.provisioner
    }
}
