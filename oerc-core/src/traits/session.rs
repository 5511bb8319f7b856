use std::fmt::Debug;

use auto_impl::auto_impl;

use crate::{Identity, WalletResult};

/// Local, synchronous persistence of the single active identity.
#[auto_impl(&, Box, Arc)]
pub trait SessionStore: Send + Sync + Debug {
    /// The stored identity, `Ok(None)` if nothing is stored, or
    /// `SessionCorrupt` if the record cannot be decoded.
    fn load(&self) -> WalletResult<Option<Identity>>;

    /// Replace the stored identity.
    fn save(&self, identity: &Identity) -> WalletResult<()>;

    /// Erase the stored identity. Erasing an empty store succeeds.
    fn clear(&self) -> WalletResult<()>;
}
