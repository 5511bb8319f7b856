use std::{fs, io, path::PathBuf};

use derive_new::new;
use tracing::debug;

use oerc_core::{Identity, SessionStore, WalletError, WalletResult};

/// Persists the active identity as a JSON file.
#[derive(Debug, Clone, new)]
pub struct LocalSessionStore {
    /// File holding the serialized identity
    path: PathBuf,
}

impl LocalSessionStore {
    fn temp_file_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Where the identity is kept.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for LocalSessionStore {
    fn load(&self) -> WalletResult<Option<Identity>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(WalletError::SessionCorrupt(format!(
                    "reading {:?}: {err}",
                    self.path
                )))
            }
        };
        let identity: Identity = serde_json::from_slice(&data).map_err(|err| {
            WalletError::SessionCorrupt(format!("decoding {:?}: {err}", self.path))
        })?;
        Ok(Some(identity))
    }

    fn save(&self, identity: &Identity) -> WalletResult<()> {
        let storage = |err: io::Error| {
            WalletError::SessionStorage(format!("writing {:?}: {err}", self.path))
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(storage)?;
        }
        let serialized = serde_json::to_vec_pretty(identity)
            .map_err(|err| WalletError::SessionStorage(err.to_string()))?;

        // write then rename so a crash never leaves a half written record
        let tmp = self.temp_file_path();
        fs::write(&tmp, serialized).map_err(storage)?;
        fs::rename(&tmp, &self.path).map_err(storage)?;
        debug!(path = ?self.path, username = %identity.username, "Saved session");
        Ok(())
    }

    fn clear(&self) -> WalletResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(WalletError::SessionStorage(format!(
                "removing {:?}: {err}",
                self.path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalSessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalSessionStore::new(dir.path().join("nested").join("session.json"));
        (dir, store)
    }

    #[test]
    fn empty_store_loads_nothing() {
        let (_dir, store) = store();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn saved_identity_survives_reload() {
        let (_dir, store) = store();
        let identity = Identity::new("alice").with_address("0xabc0000000000000000000000000000000000123");
        store.save(&identity).unwrap();

        let reopened = LocalSessionStore::new(store.path().clone());
        assert_eq!(reopened.load().unwrap(), Some(identity));

        reopened.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn garbage_is_reported_as_corrupt() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), b"{not json").unwrap();
        assert!(matches!(store.load(), Err(WalletError::SessionCorrupt(_))));
    }
}
