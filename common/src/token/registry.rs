use super::TokenDescriptor;
use crate::{
    config::*,
    crypto::Address,
    error::LedgerError,
    slot::StorageSlot,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// One row of the registry configuration file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenEntry {
    address: Address,
    #[serde(default = "default_decimals")]
    decimals: u8,
    #[serde(default, alias = "mappingSlot")]
    mapping_slot: Option<StorageSlot>,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

/// Immutable table of supported assets keyed by lower-cased symbol.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: IndexMap<String, TokenDescriptor>,
}

impl TokenRegistry {
    pub fn new<I>(descriptors: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = TokenDescriptor>,
    {
        let mut tokens = IndexMap::new();
        for descriptor in descriptors {
            let symbol = descriptor.symbol().to_string();
            if tokens.insert(symbol.clone(), descriptor).is_some() {
                return Err(LedgerError::InvalidConfig(format!(
                    "token '{}' is declared twice",
                    symbol
                )));
            }
        }

        Ok(Self { tokens })
    }

    /// The default table: eth, dai, gtc and weth
    pub fn builtin() -> Self {
        let tokens = [
            TokenDescriptor::native(NATIVE_ASSET_SYMBOL, DEFAULT_DECIMALS),
            builtin_contract("dai", DAI_ADDRESS, DAI_BALANCE_SLOT),
            builtin_contract("gtc", GTC_ADDRESS, GTC_BALANCE_SLOT),
            builtin_contract("weth", WETH_ADDRESS, WETH_BALANCE_SLOT),
        ];

        Self {
            tokens: tokens
                .into_iter()
                .map(|descriptor| (descriptor.symbol().to_string(), descriptor))
                .collect(),
        }
    }

    /// Parse a JSON object of `{ symbol: { address, decimals, mapping_slot } }`.
    ///
    /// An entry is native exactly when its address is the native sentinel; it
    /// must then have a null mapping slot. Every other entry needs a slot.
    pub fn from_json_str(json: &str) -> Result<Self, LedgerError> {
        let entries: IndexMap<String, TokenEntry> = serde_json::from_str(json)?;
        if entries.is_empty() {
            return Err(LedgerError::InvalidConfig("registry has no tokens".to_string()));
        }

        let mut descriptors = Vec::with_capacity(entries.len());
        for (symbol, entry) in entries {
            let descriptor = match (entry.address == NATIVE_ASSET_ADDRESS, entry.mapping_slot) {
                (true, None) => TokenDescriptor::native(&symbol, entry.decimals),
                (true, Some(_)) => {
                    return Err(LedgerError::InvalidConfig(format!(
                        "native token '{}' must not declare a mapping slot",
                        symbol
                    )))
                }
                (false, Some(slot)) => {
                    TokenDescriptor::contract(&symbol, entry.address, entry.decimals, slot)?
                }
                (false, None) => {
                    return Err(LedgerError::InvalidConfig(format!(
                        "token '{}' at {} has no mapping slot",
                        symbol, entry.address
                    )))
                }
            };
            descriptors.push(descriptor);
        }

        let registry = Self::new(descriptors)?;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Loaded token registry with {} tokens", registry.len());
        }
        Ok(registry)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Case-insensitive lookup
    pub fn lookup(&self, symbol: &str) -> Result<&TokenDescriptor, LedgerError> {
        self.tokens
            .get(&symbol.to_ascii_lowercase())
            .ok_or_else(|| LedgerError::UnknownToken(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.tokens.contains_key(&symbol.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.values()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// Built-in addresses are known not to be the native sentinel
fn builtin_contract(symbol: &str, address: Address, slot: u64) -> TokenDescriptor {
    TokenDescriptor::contract_unchecked(symbol, address, DEFAULT_DECIMALS, StorageSlot::from_index(slot))
}
