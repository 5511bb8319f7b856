use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::RwLock;
use tracing::{info, warn};

use oerc_core::{Identity, SessionStore, WalletError, WalletResult};

pub use self::local_storage::LocalSessionStore;

mod local_storage;

/// The single active identity, mirrored to a [`SessionStore`] on every
/// change so a reload never observes an older state than the process did.
#[derive(Debug)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Identity>>,
    restored: AtomicBool,
}

impl Session {
    /// A session backed by `store`. Nothing is loaded until [`Session::restore`].
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
            restored: AtomicBool::new(false),
        }
    }

    /// Load the persisted identity. Only the first call reads the store; later
    /// calls return the in-memory identity. An unreadable record is logged,
    /// erased, and treated as no session.
    pub fn restore(&self) -> Option<Identity> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return self.current();
        }
        let loaded = match self.store.load() {
            Ok(identity) => identity.map(Identity::normalized),
            Err(err) => {
                warn!(error = %err, "Discarding unreadable session");
                if let Err(err) = self.store.clear() {
                    warn!(error = %err, "Failed to erase unreadable session");
                }
                None
            }
        };
        if let Some(identity) = &loaded {
            info!(username = %identity.username, has_wallet = identity.has_wallet(), "Restored session");
        }
        *self.current.write() = loaded.clone();
        loaded
    }

    /// The active identity.
    pub fn current(&self) -> Option<Identity> {
        self.current.read().clone()
    }

    /// The active identity, or `NotAuthenticated`.
    pub fn require(&self) -> WalletResult<Identity> {
        self.current().ok_or(WalletError::NotAuthenticated)
    }

    /// Make `identity` the active one. The store is written first; if that
    /// fails the active identity is left unchanged.
    pub fn set(&self, identity: Identity) -> WalletResult<()> {
        let mut current = self.current.write();
        self.store.save(&identity)?;
        *current = Some(identity);
        Ok(())
    }

    /// Replace the active identity only if it still belongs to `username`.
    /// Used by operations that started under one identity and complete
    /// after the user may have signed out.
    pub fn update(&self, username: &str, identity: Identity) -> WalletResult<()> {
        let mut current = self.current.write();
        match current.as_ref() {
            Some(active) if active.username == username => {}
            _ => return Err(WalletError::NotAuthenticated),
        }
        self.store.save(&identity)?;
        *current = Some(identity);
        Ok(())
    }

    /// Forget the active identity and erase the stored record. The in-memory
    /// identity is dropped even if erasing fails.
    pub fn end(&self) -> WalletResult<()> {
        let mut current = self.current.write();
        *current = None;
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use oerc_test::MemorySessionStore;
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn restore_reads_the_store_once() {
        let store = Arc::new(MemorySessionStore::with_identity(&Identity::new("alice")));
        let session = Session::new(store.clone());

        assert_eq!(session.restore(), Some(Identity::new("alice")));
        store.save(&Identity::new("mallory")).unwrap();
        assert_eq!(session.restore(), Some(Identity::new("alice")));
    }

    #[test]
    #[traced_test]
    fn corrupt_record_means_signed_out() {
        let store = Arc::new(MemorySessionStore::corrupt("{\"user"));
        let session = Session::new(store.clone());

        assert_eq!(session.restore(), None);
        assert_eq!(store.raw(), None);
        assert!(logs_contain("Discarding unreadable session"));
    }

    #[test]
    fn changes_are_persisted_immediately() {
        let store = Arc::new(MemorySessionStore::default());
        let session = Session::new(store.clone());
        session.restore();

        let alice = Identity::new("alice").with_address("0xabc");
        session.set(alice.clone()).unwrap();
        assert_eq!(store.stored(), Some(alice));

        session.end().unwrap();
        assert_eq!(store.stored(), None);
        assert!(matches!(session.require(), Err(WalletError::NotAuthenticated)));
    }

    #[test]
    fn update_requires_the_same_user() {
        let store = Arc::new(MemorySessionStore::default());
        let session = Session::new(store.clone());
        session.set(Identity::new("alice")).unwrap();
        session.end().unwrap();

        let result = session.update("alice", Identity::new("alice").with_address("0xabc"));
        assert!(matches!(result, Err(WalletError::NotAuthenticated)));
        assert_eq!(store.stored(), None);
    }
}
