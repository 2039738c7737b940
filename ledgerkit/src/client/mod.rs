// Boundary adapters to the simulated ledger.
//
// The traits are the seams the override service depends on; `JsonRpcClient`
// implements all of them against a Hardhat or Anvil node, tests substitute
// in-memory doubles.

pub mod json_rpc;

pub use json_rpc::{JsonRpcClient, JsonRpcClientConfig, RpcDialect};

use async_trait::async_trait;
use ledgerkit_common::{
    amount::Amount, crypto::Address, error::LedgerError, slot::StorageSlot,
    token::TokenDescriptor,
};
use primitive_types::U256;

/// Privileged raw state writes, only available on a simulated ledger.
///
/// Implementations must not retry: a transport failure is returned unchanged.
#[async_trait]
pub trait LedgerStateClient: Send + Sync {
    /// Replace the native balance of `account`
    async fn set_native_balance(&self, account: &Address, amount: &U256) -> Result<(), LedgerError>;

    /// Overwrite one 32-byte storage word of `contract`
    async fn set_storage_at(
        &self,
        contract: &Address,
        slot: &StorageSlot,
        value: &[u8; 32],
    ) -> Result<(), LedgerError>;
}

/// Reads and writes that go through normal contract execution.
#[async_trait]
pub trait ContractCallClient: Send + Sync {
    /// Native: the ledger's balance of `account`. Token: `balanceOf(account)`.
    async fn read_balance(
        &self,
        token: &TokenDescriptor,
        account: &Address,
    ) -> Result<Amount, LedgerError>;

    /// Token: `approve(spender, 2^256 - 1)` sent from `holder`.
    /// Native: nothing to do, the native asset has no allowances.
    async fn grant_max_allowance(
        &self,
        token: &TokenDescriptor,
        holder: &Address,
        spender: &Address,
    ) -> Result<(), LedgerError>;
}

/// Block clock manipulation
#[async_trait]
pub trait ClockControl: Send + Sync {
    /// Move the clock forward and mine a block so the jump takes effect
    async fn increase_time(&self, seconds: u64) -> Result<(), LedgerError>;

    /// Pin the timestamp of the next mined block, returning it
    async fn set_next_block_timestamp(&self, timestamp: u64) -> Result<u64, LedgerError>;
}
