#![allow(non_snake_case)]

use std::fmt::Debug;

use async_trait::async_trait;
use mockall::mock;

use oerc_core::{Confirmation, UserPrompt};

mock! {
    pub UserPrompt {}

    impl Debug for UserPrompt {
        fn fmt<'a>(&self, f: &mut std::fmt::Formatter<'a>) -> std::fmt::Result;
    }

    #[async_trait]
    impl UserPrompt for UserPrompt {
        async fn confirm(&self, confirmation: &Confirmation) -> bool;
    }
}
