use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use oerc_core::{
    Credentials, CustodialBackend, HistoryReader, Identity, Transaction, TransferReceipt,
    TransferRequest, WalletError, WalletResult,
};

use crate::settings::{BackendConf, ExplorerConf};

/// Error payload shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ErrorBody {
    fn reason(self) -> Option<String> {
        self.error.or(self.message)
    }
}

#[derive(Debug, Serialize)]
struct UsernameBody<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct WalletBody {
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransferBody {
    hash: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionsBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    transactions: Vec<Value>,
    error: Option<String>,
}

/// Client of the custodial REST backend. Also serves the indexed transaction
/// feed through `GET /transactions`.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base: Url,
    explorer_tx_url: String,
}

impl RestBackend {
    /// Build a client from configuration. Every request is bounded by
    /// `backend.timeout_ms`.
    pub fn new(conf: &BackendConf, explorer: &ExplorerConf) -> WalletResult<Self> {
        let client = Client::builder()
            .timeout(conf.timeout())
            .build()
            .map_err(transport)?;
        Ok(Self::with_client(client, conf.url.clone(), explorer))
    }

    /// Use an existing reqwest client.
    pub fn with_client(client: Client, mut base: Url, explorer: &ExplorerConf) -> Self {
        // endpoints are joined relative to the base, which needs a trailing slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            client,
            base,
            explorer_tx_url: explorer.tx_url.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> WalletResult<Url> {
        self.base
            .join(path)
            .map_err(|err| WalletError::BackendUnavailable(format!("bad endpoint {path}: {err}")))
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> WalletResult<Response> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport)
    }
}

fn transport(err: reqwest::Error) -> WalletError {
    WalletError::BackendUnavailable(err.to_string())
}

/// Read a response body. Non-2xx statuses become `BackendRejected` carrying
/// the `error` field; a 2xx body that does not decode is `BackendUnavailable`.
async fn read<T: DeserializeOwned>(response: Response) -> WalletResult<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport)?;
    if !status.is_success() {
        let reason = serde_json::from_slice::<ErrorBody>(&bytes)
            .unwrap_or_default()
            .reason();
        return Err(WalletError::rejected(Some(status.as_u16()), reason));
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| WalletError::BackendUnavailable(format!("malformed response: {err}")))
}

/// Like [`read`] for endpoints whose successful body carries nothing.
async fn read_empty(response: Response) -> WalletResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let bytes = response.bytes().await.map_err(transport)?;
    let reason = serde_json::from_slice::<ErrorBody>(&bytes)
        .unwrap_or_default()
        .reason();
    Err(WalletError::rejected(Some(status.as_u16()), reason))
}

#[async_trait]
impl HistoryReader for RestBackend {
    #[instrument(skip(self), err(level = "debug"))]
    async fn get_transactions(&self, address: &str) -> WalletResult<Vec<Transaction>> {
        let url = self.endpoint("transactions")?;
        let response = self
            .client
            .get(url)
            .query(&[("address", address)])
            .send()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body: TransactionsBody = read(response).await?;
        if !body.success {
            return Err(WalletError::rejected(
                Some(status),
                body.error.or_else(|| Some("the indexer reported a failure".into())),
            ));
        }
        Ok(Transaction::from_records(
            &body.transactions,
            &self.explorer_tx_url,
        ))
    }
}

#[async_trait]
impl CustodialBackend for RestBackend {
    #[instrument(skip_all, fields(username = %credentials.username), err(level = "debug"))]
    async fn register(&self, credentials: &Credentials) -> WalletResult<()> {
        let response = self.post("register", credentials).await?;
        read_empty(response).await
    }

    #[instrument(skip_all, fields(username = %credentials.username), err(level = "debug"))]
    async fn login(&self, credentials: &Credentials) -> WalletResult<Identity> {
        let response = self.post("login", credentials).await?;
        let identity: Identity = read(response).await?;
        Ok(identity.normalized())
    }

    #[instrument(skip(self), err(level = "debug"))]
    async fn generate_wallet(&self, username: &str) -> WalletResult<String> {
        let response = self
            .post("generate-wallet", &UsernameBody { username })
            .await?;
        let status = response.status().as_u16();
        let body: WalletBody = read(response).await?;
        match body.address.map(|a| a.trim().to_owned()) {
            Some(address) if !address.is_empty() => Ok(address),
            _ => Err(WalletError::rejected(
                Some(status),
                Some("the backend returned no wallet address".into()),
            )),
        }
    }

    #[instrument(skip_all, fields(to = %request.to_address, amount = %request.amount), err(level = "debug"))]
    async fn transfer(&self, request: &TransferRequest) -> WalletResult<TransferReceipt> {
        let response = self.post("transfer", request).await?;
        let status = response.status().as_u16();
        let body: TransferBody = read(response).await?;
        match body.hash.filter(|h| !h.trim().is_empty()) {
            Some(hash) => Ok(TransferReceipt { hash }),
            None => Err(WalletError::rejected(Some(status), body.error)),
        }
    }
}
