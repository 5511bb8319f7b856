//! Settings for the wallet client.
//!
//! ## Configuration
//!
//! Settings are read from several sources, later ones overriding earlier
//! ones:
//!
//! 1. Every `*.json` file in `./config`, in file name order. A missing
//!    directory is fine; every value has a default.
//! 2. The files named in the comma separated `CONFIG_FILES` variable.
//! 3. Environment variables prefixed with `OERC__`. Nested keys are separated
//!    by `__` and lowercased, so `OERC__BACKEND__TIMEOUT_MS=5000`
//!    sets `backend.timeout_ms`.
//!
//! JSON keys are snake case, matching the field names below.

use std::{path::PathBuf, time::Duration};

use eyre::Result;
use serde::Deserialize;
use url::Url;

use oerc_ethereum::ConnectionConf;

pub use self::trace::{Level, Style, TracingConfig};

/// Configuration source loading
pub mod loader;
mod trace;

/// Default custodial backend.
pub const DEFAULT_BACKEND_URL: &str = "https://my-blockchain-app-back.vercel.app";
/// Default transaction page prefix of the block explorer.
pub const DEFAULT_EXPLORER_TX_URL: &str = "https://sepolia.etherscan.io/tx/";
/// Default location of the persisted identity.
pub const DEFAULT_SESSION_PATH: &str = "./data/session.json";

/// Everything the wallet client can be configured with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Custodial REST backend
    pub backend: BackendConf,
    /// Chain RPC and token contract
    pub chain: ConnectionConf,
    /// Block explorer links
    pub explorer: ExplorerConf,
    /// Local identity persistence
    pub session: SessionConf,
    /// Logging
    pub tracing: TracingConfig,
}

impl Settings {
    /// Load settings from `./config`, `CONFIG_FILES` and the environment.
    pub fn load() -> Result<Self> {
        loader::load_settings("./config")
    }
}

/// Custodial REST backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConf {
    /// Base url; endpoints are resolved relative to it
    pub url: Url,
    /// Upper bound on a single request
    pub timeout_ms: u64,
}

impl BackendConf {
    /// Upper bound on a single request.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BackendConf {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend url is valid"),
            timeout_ms: 15_000,
        }
    }
}

/// Block explorer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExplorerConf {
    /// Prefix a transaction hash is appended to
    pub tx_url: String,
}

impl Default for ExplorerConf {
    fn default() -> Self {
        Self {
            tx_url: DEFAULT_EXPLORER_TX_URL.to_owned(),
        }
    }
}

/// Local session store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConf {
    /// File holding the serialized identity
    pub path: PathBuf,
}

impl Default for SessionConf {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SESSION_PATH),
        }
    }
}
