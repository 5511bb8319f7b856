use std::time::Duration;

use ethers::types::H160;
use serde::Deserialize;
use url::Url;

use oerc_core::{TOKEN_DECIMALS, TOKEN_SYMBOL};

/// Default JSON-RPC endpoint (Sepolia).
pub const DEFAULT_RPC_URL: &str = "https://1rpc.io/sepolia";
/// Default OERC token contract on Sepolia.
pub const DEFAULT_TOKEN_ADDRESS: &str = "0x718dF080ddCB27Ee16B482c638f9Ed4b11e7Daf4";

/// Ethereum connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConf {
    /// JSON-RPC endpoint
    pub rpc_url: Url,
    /// ERC-20 token contract
    pub token_address: H160,
    /// Decimal count used to scale `balanceOf`
    pub decimals: u8,
    /// Token symbol for display
    pub symbol: String,
    /// Network name for display
    pub network: String,
    /// Upper bound on a single RPC call
    pub timeout_ms: u64,
}

impl ConnectionConf {
    /// Upper bound on a single RPC call.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ConnectionConf {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.parse().expect("default rpc url is valid"),
            token_address: DEFAULT_TOKEN_ADDRESS
                .parse()
                .expect("default token address is valid"),
            decimals: TOKEN_DECIMALS,
            symbol: TOKEN_SYMBOL.to_owned(),
            network: "Sepolia".to_owned(),
            timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let conf: ConnectionConf =
            serde_json::from_str(r#"{"rpc_url": "http://localhost:8545", "timeout_ms": 500}"#)
                .unwrap();
        assert_eq!(conf.rpc_url.as_str(), "http://localhost:8545/");
        assert_eq!(conf.timeout(), Duration::from_millis(500));
        assert_eq!(conf.decimals, 18);
        assert_eq!(conf.symbol, "OERC");
    }
}
