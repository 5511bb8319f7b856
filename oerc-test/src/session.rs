use parking_lot::Mutex;

use oerc_core::{Identity, SessionStore, WalletError, WalletResult};

/// In-memory session store. Holds the serialized record so that decode
/// failures can be simulated with [`MemorySessionStore::corrupt`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<String>>,
    saves: Mutex<usize>,
}

impl MemorySessionStore {
    /// A store that already holds `identity`.
    pub fn with_identity(identity: &Identity) -> Self {
        let store = Self::default();
        *store.record.lock() = serde_json::to_string(identity).ok();
        store
    }

    /// A store holding an undecodable record.
    pub fn corrupt(raw: &str) -> Self {
        let store = Self::default();
        *store.record.lock() = Some(raw.to_owned());
        store
    }

    /// The raw stored record.
    pub fn raw(&self) -> Option<String> {
        self.record.lock().clone()
    }

    /// The stored identity, if one is stored and readable.
    pub fn stored(&self) -> Option<Identity> {
        self.raw().and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> WalletResult<Option<Identity>> {
        match self.record.lock().as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| WalletError::SessionCorrupt(e.to_string())),
        }
    }

    fn save(&self, identity: &Identity) -> WalletResult<()> {
        let raw = serde_json::to_string(identity)
            .map_err(|e| WalletError::SessionStorage(e.to_string()))?;
        *self.record.lock() = Some(raw);
        *self.saves.lock() += 1;
        Ok(())
    }

    fn clear(&self) -> WalletResult<()> {
        *self.record.lock() = None;
        Ok(())
    }
}
