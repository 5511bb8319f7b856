//! Implementation of the chain-facing capabilities of the OERC wallet for
//! Ethereum-compatible networks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use balance::*;
pub use config::*;

mod balance;
mod config;

/// Generated bindings for the subset of the ERC-20 interface the wallet reads
#[allow(missing_docs)]
pub mod interfaces {
    ethers::contract::abigen!(
        Erc20,
        r#"[
            function balanceOf(address owner) external view returns (uint256)
        ]"#,
    );
}
