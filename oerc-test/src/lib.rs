//! This crate contains mocks and fakes for testing the OERC wallet client.

#![forbid(unsafe_code)]
#![cfg_attr(test, warn(missing_docs))]

/// mockall mocks of the capability traits
pub mod mocks;

mod notifier;
mod scripted;
mod session;

pub use notifier::*;
pub use scripted::*;
pub use session::*;
