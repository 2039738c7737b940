use anyhow::Error as AnyError;
use serde_json::Error as SerdeError;
use thiserror::Error;

/// Errors raised while resolving, deriving or applying a ledger override.
///
/// Every variant except `Transport` is a caller error and is never retried.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Requested symbol is absent from the token registry
    #[error("Unknown token '{0}'")]
    UnknownToken(String),

    /// Address or slot input has the wrong length or is not hex
    #[error("Invalid key '{input}': {reason}")]
    InvalidKey { input: String, reason: &'static str },

    /// Amount does not fit in a 32-byte storage word
    #[error("Amount needs {bits} bits, storage word holds 256")]
    AmountOverflow { bits: u64 },

    /// Amount text could not be parsed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Token table supplied at startup is malformed
    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid registry configuration: {0}")]
    ConfigFormat(#[from] SerdeError),

    /// The ledger or contract call boundary rejected or could not service the request
    #[error("Transport failure: {0:#}")]
    Transport(#[from] AnyError),
}

impl LedgerError {
    pub fn invalid_key(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            input: input.into(),
            reason,
        }
    }

    /// Whether the failure comes from the request itself rather than the ledger.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }
}
