//! This crate contains the core primitives of the OERC wallet client: the
//! account and transaction types, the error taxonomy, and the capability
//! traits through which the orchestration layer reaches the chain, the
//! custodial backend, local storage and the user.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use error::*;
pub use traits::*;
pub use types::*;

mod error;
/// Capability traits implemented by chain, backend, storage and view adapters
pub mod traits;
/// Account, transaction and transfer types
pub mod types;
/// Bounded waiting on external calls
pub mod timeout;
