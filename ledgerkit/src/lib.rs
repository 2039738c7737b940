//! # Ledgerkit
//!
//! Forces token balances and allowances on a simulated EVM ledger (Hardhat,
//! Anvil) without calling the tokens' own mint or transfer entry points.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ledgerkit::prelude::*;
//!
//! let registry = Arc::new(TokenRegistry::builtin());
//! let client = Arc::new(JsonRpcClient::new("http://127.0.0.1:8545")?);
//! let service = BalanceOverrideService::new(registry, client.clone(), client);
//!
//! let whale: Address = "0x00000000000000000000000000000000000000aa".parse()?;
//! service.set_balance("dai", &whale, &parse_amount("1000000000000000000")?).await?;
//! ```

/// Boundary adapters to the ledger's RPC surface
pub mod client;

/// Runtime configuration and validation
pub mod config;

/// The balance override orchestration
pub mod service;

// Command line front end
pub mod cli;

// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::client::{
        ClockControl, ContractCallClient, JsonRpcClient, JsonRpcClientConfig, LedgerStateClient,
        RpcDialect,
    };
    pub use crate::service::BalanceOverrideService;
    pub use ledgerkit_common::{
        amount::{parse_amount, parse_units, Amount},
        crypto::Address,
        error::LedgerError,
        slot::StorageSlot,
        token::{TokenDescriptor, TokenRegistry},
    };
    pub use std::sync::Arc;
}

pub use service::BalanceOverrideService;
