use thiserror::Error;

/// The result of any wallet operation.
pub type WalletResult<T> = Result<T, WalletError>;

/// Message shown when a transfer fails without a reason from the backend.
pub const GENERIC_TRANSFER_FAILURE: &str = "The transfer could not be completed, please try again";

/// Problems with user input, detected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Transfer form has no recipient address
    #[error("recipient address is required")]
    MissingRecipient,
    /// Transfer form has no amount
    #[error("amount is required")]
    MissingAmount,
    /// Login or registration without a username or password
    #[error("username and password are required")]
    MissingCredentials,
    /// A string that cannot be parsed as an account address
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    /// The identity already has a custodial wallet
    #[error("a wallet has already been created for this account")]
    WalletAlreadyProvisioned,
}

/// WalletError contains every failure the synchronization and transfer
/// subsystem can observe. None of them is fatal; each can be recovered by
/// retrying the user action that triggered it.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Bad or missing user input
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The chain RPC read could not complete
    #[error("chain unavailable: {0}")]
    ChainUnavailable(String),
    /// A REST call failed at the transport level
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// A REST call completed with an application-level error payload
    #[error("backend rejected the request{}: {}", .status.map(|s| format!(" ({s})")).unwrap_or_default(), .message.as_deref().unwrap_or("no reason given"))]
    BackendRejected {
        /// HTTP status, when the rejection came with one
        status: Option<u16>,
        /// The `error` field of the response body, verbatim
        message: Option<String>,
    },
    /// The persisted identity could not be decoded
    #[error("stored session is unreadable: {0}")]
    SessionCorrupt(String),
    /// The persisted identity could not be written or erased
    #[error("session storage failed: {0}")]
    SessionStorage(String),
    /// No identity is active
    #[error("not signed in")]
    NotAuthenticated,
    /// The active identity has no wallet address yet
    #[error("this account has no wallet yet")]
    MissingWallet,
    /// A transfer for this identity is still being processed
    #[error("a transfer is already being processed")]
    TransferInFlight,
    /// Wallet generation is already running
    #[error("a wallet is already being created")]
    ProvisioningInFlight,
}

impl WalletError {
    /// Build a `BackendRejected` error.
    pub fn rejected(status: Option<u16>, message: Option<String>) -> Self {
        Self::BackendRejected {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// True for failures that are expected to clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ChainUnavailable(_) | Self::BackendUnavailable(_)
        )
    }

    /// The message the backend attached to a rejection, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::BackendRejected {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Text to present to the user for this failure.
    pub fn user_message(&self) -> String {
        match self.backend_message() {
            Some(message) => message.to_owned(),
            None => self.to_string(),
        }
    }
}
