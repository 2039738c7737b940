use crate::client::{ContractCallClient, LedgerStateClient};
use ledgerkit_common::{
    amount::{encode_word, parse_units, Amount},
    crypto::Address,
    error::LedgerError,
    slot::{compute_slot, StorageSlot},
    token::{TokenKind, TokenRegistry},
};
use log::{debug, info};
use std::sync::Arc;

/// Sets any account's balance of any registered asset without going through
/// the token's own mint or transfer entry points.
///
/// Native balances go through the ledger's balance override; token balances
/// are written straight into the token contract's balance mapping. Each
/// override is a single state write: it either lands or leaves the stored
/// balance untouched. Concurrent overrides of the same (token, account) pair
/// are not serialized, the ledger keeps whichever write it commits last.
pub struct BalanceOverrideService {
    registry: Arc<TokenRegistry>,
    ledger: Arc<dyn LedgerStateClient>,
    contracts: Arc<dyn ContractCallClient>,
}

impl BalanceOverrideService {
    pub fn new(
        registry: Arc<TokenRegistry>,
        ledger: Arc<dyn LedgerStateClient>,
        contracts: Arc<dyn ContractCallClient>,
    ) -> Self {
        Self {
            registry,
            ledger,
            contracts,
        }
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Force `account`'s balance of `symbol` to exactly `amount`.
    ///
    /// # Errors
    ///
    /// - `UnknownToken` if `symbol` is not registered
    /// - `AmountOverflow` if `amount` does not fit in 256 bits
    /// - `Transport` if the ledger rejects the write
    ///
    /// No call reaches the ledger unless resolution and encoding succeed.
    pub async fn set_balance(
        &self,
        symbol: &str,
        account: &Address,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let descriptor = self.registry.lookup(symbol)?;
        let word = encode_word(amount)?;

        match descriptor.kind() {
            TokenKind::Native => {
                debug!("Setting native balance of {} to {}", account, amount);
                self.ledger.set_native_balance(account, &word).await?;
            }
            TokenKind::Contract {
                address,
                mapping_slot,
            } => {
                let slot = compute_slot(mapping_slot, account);
                debug!(
                    "Writing {} balance of {} to slot {} of {}",
                    descriptor.symbol(),
                    account,
                    slot,
                    address
                );
                self.ledger
                    .set_storage_at(address, &slot, &word.to_big_endian())
                    .await?;
            }
        }

        info!("Set {} balance of {} to {}", descriptor.symbol(), account, amount);
        Ok(())
    }

    /// Same as [`Self::set_balance`] with a human amount such as `"1.5"`,
    /// scaled by the token's decimals.
    pub async fn set_balance_units(
        &self,
        symbol: &str,
        account: &Address,
        amount: &str,
    ) -> Result<Amount, LedgerError> {
        let descriptor = self.registry.lookup(symbol)?;
        let amount = parse_units(amount, descriptor.decimals())?;
        self.set_balance(symbol, account, &amount).await?;
        Ok(amount)
    }

    /// Slot holding `account`'s balance, `None` for the native asset
    pub fn balance_slot(
        &self,
        symbol: &str,
        account: &Address,
    ) -> Result<Option<StorageSlot>, LedgerError> {
        let descriptor = self.registry.lookup(symbol)?;
        Ok(descriptor
            .mapping_slot()
            .map(|base| compute_slot(base, account)))
    }

    pub async fn balance_of(&self, symbol: &str, account: &Address) -> Result<Amount, LedgerError> {
        let descriptor = self.registry.lookup(symbol)?;
        self.contracts.read_balance(descriptor, account).await
    }

    /// Let `spender` move all of `holder`'s `symbol` tokens
    pub async fn approve(
        &self,
        symbol: &str,
        holder: &Address,
        spender: &Address,
    ) -> Result<(), LedgerError> {
        let descriptor = self.registry.lookup(symbol)?;
        self.contracts
            .grant_max_allowance(descriptor, holder, spender)
            .await?;

        if !descriptor.is_native() {
            info!(
                "Approved {} to spend {} of {}",
                spender,
                descriptor.symbol(),
                holder
            );
        }
        Ok(())
    }
}
