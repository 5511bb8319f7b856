use std::fmt::{self, Debug};

use async_trait::async_trait;
use auto_impl::auto_impl;

use crate::ValidationError;

/// A mutating action that holds a non-dismissible progress indicator while
/// it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// A transfer is being submitted
    Transfer,
    /// A custodial wallet is being generated
    WalletGeneration,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Transfer => write!(f, "Sending tokens"),
            Activity::WalletGeneration => write!(f, "Creating wallet"),
        }
    }
}

/// Something the view should tell the user. Only `Busy` is blocking; every
/// other notice is a lightweight, non-blocking message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Show a non-cancelable progress indicator for `Activity`
    Busy(Activity),
    /// Hide the progress indicator for `Activity`
    Done(Activity),
    /// A user-requested refresh completed
    Updated,
    /// A user-requested refresh failed; prior data is still shown
    RefreshFailed(String),
    /// The form is incomplete; ask the user to fill it in
    Incomplete(ValidationError),
    /// Signed in
    Welcome {
        /// Account name
        username: String,
    },
    /// Sign in or registration failed
    AuthFailed(String),
    /// The backend accepted a transfer
    TransferSubmitted {
        /// Transaction hash
        hash: String,
    },
    /// A transfer failed; the form has been kept for a retry
    TransferFailed(String),
    /// A custodial wallet was created
    WalletCreated {
        /// The new address
        address: String,
    },
    /// Wallet generation failed; the identity is unchanged
    WalletFailed(String),
}

/// Blocking confirmation shown before a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Recipient exactly as it will be submitted
    pub to_address: String,
    /// Amount exactly as it will be submitted
    pub amount: String,
    /// Token symbol
    pub symbol: String,
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Send {} {} to {}?", self.amount, self.symbol, self.to_address)
    }
}

/// Presents blocking questions to the user.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait UserPrompt: Send + Sync + Debug {
    /// Ask the user to confirm a transfer. `false` means cancelled.
    async fn confirm(&self, confirmation: &Confirmation) -> bool;
}

/// Delivers notices to the user. Must not block.
#[auto_impl(&, Box, Arc)]
pub trait Notifier: Send + Sync + Debug {
    /// Show `notice`.
    fn notify(&self, notice: Notice);
}
