#![allow(non_snake_case)]

use std::fmt::Debug;

use async_trait::async_trait;
use mockall::mock;

use oerc_core::{BalanceReader, WalletResult};

mock! {
    pub BalanceReader {}

    impl Debug for BalanceReader {
        fn fmt<'a>(&self, f: &mut std::fmt::Formatter<'a>) -> std::fmt::Result;
    }

    #[async_trait]
    impl BalanceReader for BalanceReader {
        async fn get_balance(&self, address: &str) -> WalletResult<String>;
    }
}
