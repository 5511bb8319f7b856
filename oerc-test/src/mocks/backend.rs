#![allow(non_snake_case)]

use std::fmt::Debug;

use async_trait::async_trait;
use mockall::mock;

use oerc_core::{
    Credentials, CustodialBackend, HistoryReader, Identity, Transaction, TransferReceipt,
    TransferRequest, WalletResult,
};

mock! {
    pub HistoryReader {}

    impl Debug for HistoryReader {
        fn fmt<'a>(&self, f: &mut std::fmt::Formatter<'a>) -> std::fmt::Result;
    }

    #[async_trait]
    impl HistoryReader for HistoryReader {
        async fn get_transactions(&self, address: &str) -> WalletResult<Vec<Transaction>>;
    }
}

mock! {
    pub CustodialBackend {}

    impl Debug for CustodialBackend {
        fn fmt<'a>(&self, f: &mut std::fmt::Formatter<'a>) -> std::fmt::Result;
    }

    #[async_trait]
    impl CustodialBackend for CustodialBackend {
        async fn register(&self, credentials: &Credentials) -> WalletResult<()>;
        async fn login(&self, credentials: &Credentials) -> WalletResult<Identity>;
        async fn generate_wallet(&self, username: &str) -> WalletResult<String>;
        async fn transfer(&self, request: &TransferRequest) -> WalletResult<TransferReceipt>;
    }
}
