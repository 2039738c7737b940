use crate::{crypto::strip_hex_prefix, error::LedgerError};
use num_bigint::BigUint;
use primitive_types::U256;

/// Arbitrary-precision non-negative amount in the asset's smallest unit
pub type Amount = BigUint;

/// Number of bits a raw storage word can hold
pub const WORD_BITS: u64 = 256;

/// Parse an amount written in decimal or as `0x` hex
pub fn parse_amount(value: &str) -> Result<Amount, LedgerError> {
    let value = value.trim();
    let (digits, radix) = if value.starts_with("0x") || value.starts_with("0X") {
        (strip_hex_prefix(value), 16)
    } else {
        (value, 10)
    };

    let valid = !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    if !valid {
        return Err(LedgerError::InvalidAmount(value.to_string()));
    }

    BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| LedgerError::InvalidAmount(value.to_string()))
}

/// Parse a human amount such as `1.5` and scale it by `10^decimals`
pub fn parse_units(value: &str, decimals: u8) -> Result<Amount, LedgerError> {
    let value = value.trim();
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(LedgerError::InvalidAmount(value.to_string()));
    }

    // Trailing zeros carry no precision
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(LedgerError::InvalidAmount(format!(
            "{} has more than {} fractional digits",
            value, decimals
        )));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let padded = format!("{}{:0<width$}", whole, fraction, width = decimals as usize);
    if !padded.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::InvalidAmount(value.to_string()));
    }

    BigUint::parse_bytes(padded.as_bytes(), 10)
        .ok_or_else(|| LedgerError::InvalidAmount(value.to_string()))
}

/// Fit an amount into a 256-bit storage word.
///
/// `U256::to_big_endian()` of the result is the 32-byte, zero-padded,
/// big-endian value written to raw storage.
pub fn encode_word(amount: &Amount) -> Result<U256, LedgerError> {
    let bits = amount.bits();
    if bits > WORD_BITS {
        return Err(LedgerError::AmountOverflow { bits });
    }

    Ok(U256::from_big_endian(&amount.to_bytes_be()))
}

pub fn word_to_amount(word: &U256) -> Amount {
    BigUint::from_bytes_be(&word.to_big_endian())
}

/// Minimal `0x` hex for a JSON-RPC quantity, `0x0` for zero
pub fn u256_quantity_hex(value: &U256) -> String {
    quantity_hex(&value.to_big_endian())
}

pub(crate) fn quantity_hex(bytes: &[u8]) -> String {
    let digits = hex::encode(bytes);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed)
    }
}
