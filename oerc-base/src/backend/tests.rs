use std::{collections::HashMap, time::Duration};

use axum::{
    extract::Query,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use url::Url;

use oerc_core::{
    Credentials, CustodialBackend, HistoryReader, TransferRequest, WalletError,
};

use super::RestBackend;
use crate::settings::{BackendConf, ExplorerConf};

const ALICE: &str = "0xabc0000000000000000000000000000000000123";

async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn backend(url: Url, timeout_ms: u64) -> RestBackend {
    RestBackend::new(&BackendConf { url, timeout_ms }, &ExplorerConf::default()).unwrap()
}

#[tokio::test]
async fn login_returns_identity() {
    let router = Router::new().route(
        "/login",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({"username": "alice", "password": "pw"}));
            Json(json!({"username": "alice", "wallet_address": ALICE}))
        }),
    );
    let backend = backend(serve(router).await, 5_000);

    let identity = backend
        .login(&Credentials::new(" alice ", "pw"))
        .await
        .unwrap();

    assert_eq!(identity.username, "alice");
    assert_eq!(identity.address(), Some(ALICE));
}

#[tokio::test]
async fn login_rejection_carries_backend_reason() {
    let router = Router::new().route(
        "/login",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid credentials"})),
            )
        }),
    );
    let backend = backend(serve(router).await, 5_000);

    let err = backend
        .login(&Credentials::new("alice", "nope"))
        .await
        .unwrap_err();

    match err {
        WalletError::BackendRejected { status, message } => {
            assert_eq!(status, Some(401));
            assert_eq!(message.as_deref(), Some("Invalid credentials"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn register_accepts_any_success_body() {
    let router = Router::new().route("/register", post(|| async { StatusCode::CREATED }));
    let backend = backend(serve(router).await, 5_000);
    backend
        .register(&Credentials::new("carol", "pw"))
        .await
        .unwrap();
}

#[tokio::test]
async fn transactions_are_parsed_and_bad_records_dropped() {
    let router = Router::new().route(
        "/transactions",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            assert_eq!(query.get("address").map(String::as_str), Some(ALICE));
            Json(json!({
                "success": true,
                "transactions": [
                    {"hash": "0x01", "from": ALICE, "to": "0xb0b", "value": "1500000000000000000",
                     "tokenDecimal": "18", "tokenSymbol": "OERC", "timeStamp": "1700000000"},
                    {"from": ALICE, "to": "0xb0b", "value": "1"},
                ]
            }))
        }),
    );
    let backend = backend(serve(router).await, 5_000);

    let transactions = backend.get_transactions(ALICE).await.unwrap();

    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].hash, "0x01");
    assert_eq!(transactions[0].amount(), "1.5");
    assert_eq!(
        transactions[0].explorer_url,
        "https://sepolia.etherscan.io/tx/0x01"
    );
}

#[tokio::test]
async fn empty_history_is_not_an_error() {
    let router = Router::new().route(
        "/transactions",
        get(|| async { Json(json!({"success": true, "transactions": []})) }),
    );
    let backend = backend(serve(router).await, 5_000);
    assert!(backend.get_transactions(ALICE).await.unwrap().is_empty());
}

#[tokio::test]
async fn unsuccessful_history_is_rejected() {
    let router = Router::new().route(
        "/transactions",
        get(|| async { Json(json!({"success": false, "error": "indexer lagging"})) }),
    );
    let backend = backend(serve(router).await, 5_000);

    let err = backend.get_transactions(ALICE).await.unwrap_err();
    assert_eq!(err.backend_message(), Some("indexer lagging"));
}

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = backend(Url::parse(&format!("http://{addr}")).unwrap(), 5_000);

    let err = backend.get_transactions(ALICE).await.unwrap_err();
    assert!(matches!(err, WalletError::BackendUnavailable(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn slow_backend_times_out() {
    let router = Router::new().route(
        "/transactions",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"success": true, "transactions": []}))
        }),
    );
    let backend = backend(serve(router).await, 100);

    let err = backend.get_transactions(ALICE).await.unwrap_err();
    assert!(matches!(err, WalletError::BackendUnavailable(_)));
}

#[tokio::test]
async fn transfer_posts_camel_case_body() {
    let router = Router::new().route(
        "/transfer",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(
                body,
                json!({"fromUsername": "alice", "toAddress": "0xb0b", "amount": "10.5"})
            );
            Json(json!({"hash": "0xfeed"}))
        }),
    );
    let backend = backend(serve(router).await, 5_000);

    let receipt = backend
        .transfer(&TransferRequest::new(
            "alice".into(),
            "0xb0b".into(),
            "10.5".into(),
        ))
        .await
        .unwrap();
    assert_eq!(receipt.hash, "0xfeed");
}

#[tokio::test]
async fn transfer_error_is_verbatim() {
    let router = Router::new().route(
        "/transfer",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Insufficient balance"})),
            )
        }),
    );
    let backend = backend(serve(router).await, 5_000);

    let err = backend
        .transfer(&TransferRequest::new(
            "alice".into(),
            "0xb0b".into(),
            "1000".into(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Insufficient balance");
}

#[tokio::test]
async fn generate_wallet_sends_username() {
    let router = Router::new().route(
        "/generate-wallet",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({"username": "bob"}));
            Json(json!({"address": ALICE}))
        }),
    );
    let backend = backend(serve(router).await, 5_000);

    assert_eq!(backend.generate_wallet("bob").await.unwrap(), ALICE);
}

#[tokio::test]
async fn generate_wallet_without_address_fails() {
    let router = Router::new().route(
        "/generate-wallet",
        post(|| async { Json(json!({"address": ""})) }),
    );
    let backend = backend(serve(router).await, 5_000);

    assert!(matches!(
        backend.generate_wallet("bob").await,
        Err(WalletError::BackendRejected { .. })
    ));
}

#[tokio::test]
async fn base_path_is_kept() {
    let router = Router::new().route(
        "/api/login",
        post(|| async { Json(json!({"username": "alice"})) }),
    );
    let url = serve(router).await.join("api").unwrap();
    let backend = backend(url, 5_000);

    let identity = backend.login(&Credentials::new("alice", "pw")).await.unwrap();
    assert!(!identity.has_wallet());
}
