use crate::{
    config::NATIVE_ASSET_ADDRESS,
    crypto::Address,
    error::LedgerError,
    slot::StorageSlot,
};
use serde::Serialize;

/// Where an asset's balances live
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TokenKind {
    /// The ledger's built-in balance, tracked outside any contract
    Native,
    /// A contract keeping balances in a `mapping(address => uint256)`
    Contract {
        address: Address,
        mapping_slot: StorageSlot,
    },
}

/// Static description of one supported asset
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenDescriptor {
    symbol: String,
    decimals: u8,
    #[serde(flatten)]
    kind: TokenKind,
}

impl TokenDescriptor {
    pub fn native(symbol: &str, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_ascii_lowercase(),
            decimals,
            kind: TokenKind::Native,
        }
    }

    /// Describe a mapping-backed token.
    ///
    /// Fails if `address` is the native sentinel, which is never a contract.
    pub fn contract(
        symbol: &str,
        address: Address,
        decimals: u8,
        mapping_slot: StorageSlot,
    ) -> Result<Self, LedgerError> {
        if address == NATIVE_ASSET_ADDRESS {
            return Err(LedgerError::InvalidConfig(format!(
                "token '{}' uses the native asset address but declares a mapping slot",
                symbol
            )));
        }

        Ok(Self::contract_unchecked(symbol, address, decimals, mapping_slot))
    }

    pub(crate) fn contract_unchecked(
        symbol: &str,
        address: Address,
        decimals: u8,
        mapping_slot: StorageSlot,
    ) -> Self {
        Self {
            symbol: symbol.to_ascii_lowercase(),
            decimals,
            kind: TokenKind::Contract {
                address,
                mapping_slot,
            },
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn is_native(&self) -> bool {
        matches!(self.kind, TokenKind::Native)
    }

    /// Contract address, or the native sentinel for the native asset
    pub fn address(&self) -> Address {
        match &self.kind {
            TokenKind::Native => NATIVE_ASSET_ADDRESS,
            TokenKind::Contract { address, .. } => *address,
        }
    }

    /// Base slot of the balance mapping, `None` exactly when native
    pub fn mapping_slot(&self) -> Option<&StorageSlot> {
        match &self.kind {
            TokenKind::Native => None,
            TokenKind::Contract { mapping_slot, .. } => Some(mapping_slot),
        }
    }
}
