//! This crate contains the orchestration layer of the OERC wallet client:
//! settings, tracing, the REST backend client, session persistence, and
//! the components that keep the account view consistent with the chain and
//! the backend while the user signs in, transfers and provisions wallets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use backend::*;
pub use client::*;
pub use provisioner::*;
pub use session::*;
pub use sync::*;
pub use transfer::*;

/// Settings and configuration
pub mod settings;

mod backend;
mod client;
mod provisioner;
mod session;
mod sync;
mod transfer;
