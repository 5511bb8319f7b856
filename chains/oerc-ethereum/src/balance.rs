use std::{fmt::Debug, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{H160, U256},
};
use tracing::{debug, instrument};

use oerc_core::{
    format_units,
    timeout::{bounded, chain_timeout},
    BalanceReader, ValidationError, WalletError, WalletResult,
};

use crate::{interfaces::Erc20, ConnectionConf};

/// Reads the OERC balance of an account with a single `balanceOf` call at
/// the current chain head.
#[derive(Debug)]
pub struct EthereumBalanceReader<M>
where
    M: Middleware,
{
    contract: Erc20<M>,
    decimals: u8,
    timeout: Duration,
}

impl EthereumBalanceReader<Provider<Http>> {
    /// Connect to the configured JSON-RPC endpoint over HTTP.
    pub fn from_conf(conf: &ConnectionConf) -> WalletResult<Self> {
        let provider = Provider::<Http>::try_from(conf.rpc_url.as_str())
            .map_err(|e| WalletError::ChainUnavailable(format!("bad rpc url: {e}")))?;
        Ok(Self::new(Arc::new(provider), conf))
    }
}

impl<M> EthereumBalanceReader<M>
where
    M: Middleware + 'static,
{
    /// Create a reader over an existing middleware stack.
    pub fn new(provider: Arc<M>, conf: &ConnectionConf) -> Self {
        Self {
            contract: Erc20::new(conf.token_address, provider),
            decimals: conf.decimals,
            timeout: conf.timeout(),
        }
    }

    async fn raw_balance(&self, owner: H160) -> WalletResult<U256> {
        let call = self.contract.balance_of(owner);
        bounded(
            self.timeout,
            async {
                call.call()
                    .await
                    .map_err(|e| WalletError::ChainUnavailable(e.to_string()))
            },
            chain_timeout,
        )
        .await
    }
}

#[async_trait]
impl<M> BalanceReader for EthereumBalanceReader<M>
where
    M: Middleware + 'static,
{
    #[instrument(skip(self), err(level = "debug"))]
    async fn get_balance(&self, address: &str) -> WalletResult<String> {
        let owner = parse_address(address)?;
        let raw = self.raw_balance(owner).await?;
        debug!(%raw, "Read token balance");
        Ok(format_units(raw, self.decimals))
    }
}

/// Parse a hex account address, with or without checksum casing.
pub fn parse_address(address: &str) -> WalletResult<H160> {
    H160::from_str(address.trim())
        .map_err(|_| ValidationError::InvalidAddress(address.to_owned()).into())
}

#[cfg(test)]
mod tests {
    use ethers::{
        abi::{encode, Token},
        providers::{MockProvider, Provider},
        types::Bytes,
    };

    use super::*;

    const OWNER: &str = "0xabcdef0000000000000000000000000000000123";

    fn reader(mock: MockProvider, timeout_ms: u64) -> EthereumBalanceReader<Provider<MockProvider>> {
        let conf = ConnectionConf {
            timeout_ms,
            ..ConnectionConf::default()
        };
        EthereumBalanceReader::new(Arc::new(Provider::new(mock)), &conf)
    }

    #[tokio::test]
    async fn scales_balance_by_token_decimals() {
        let mock = MockProvider::new();
        let raw = U256::from_dec_str("10500000000000000000").unwrap();
        mock.push::<Bytes, _>(Bytes::from(encode(&[Token::Uint(raw)])))
            .unwrap();

        let balance = reader(mock, 1_000).get_balance(OWNER).await.unwrap();
        assert_eq!(balance, "10.5");
    }

    #[tokio::test]
    async fn rpc_failure_is_chain_unavailable() {
        // no queued response: the provider errors out on the eth_call
        let err = reader(MockProvider::new(), 1_000)
            .get_balance(OWNER)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::ChainUnavailable(_)), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_response_is_chain_unavailable() {
        let mock = MockProvider::new();
        mock.push::<Bytes, _>(Bytes::from(vec![0x01, 0x02])).unwrap();

        let err = reader(mock, 1_000).get_balance(OWNER).await.unwrap_err();
        assert!(matches!(err, WalletError::ChainUnavailable(_)), "{err:?}");
    }

    #[tokio::test]
    async fn invalid_owner_is_rejected_before_any_call() {
        let mock = MockProvider::new();
        let err = reader(mock, 1_000).get_balance("not-an-address").await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::Validation(ValidationError::InvalidAddress(_))
        ));
    }
}
