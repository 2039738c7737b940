// Storage slot derivation for single-level `mapping(address => value)` layouts.
//
// Solidity places the value for `key` in a mapping declared at slot `p` at
// keccak256(pad32(key) ++ pad32(p)). Nested mappings, dynamic arrays, packed
// structs and Vyper layouts use different rules and are not handled here.

use crate::{
    crypto::{keccak256, strip_hex_prefix, Address, ADDRESS_SIZE},
    error::LedgerError,
};
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Error, Formatter};

pub const SLOT_SIZE: usize = 32;

/// A 32-byte location inside a contract's persistent key-value store.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Hash)]
pub struct StorageSlot([u8; SLOT_SIZE]);

impl StorageSlot {
    pub const fn new(bytes: [u8; SLOT_SIZE]) -> Self {
        StorageSlot(bytes)
    }

    /// Slot at a small declared index, e.g. `StorageSlot::from_index(2)`
    pub fn from_index(index: u64) -> Self {
        let mut bytes = [0u8; SLOT_SIZE];
        bytes[SLOT_SIZE - 8..].copy_from_slice(&index.to_be_bytes());
        StorageSlot(bytes)
    }

    /// Left-pad up to 32 big-endian bytes into a slot
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LedgerError> {
        if bytes.len() > SLOT_SIZE {
            return Err(LedgerError::invalid_key(
                hex::encode(bytes),
                "slot index exceeds 32 bytes",
            ));
        }

        let mut padded = [0u8; SLOT_SIZE];
        padded[SLOT_SIZE - bytes.len()..].copy_from_slice(bytes);
        Ok(StorageSlot(padded))
    }

    /// Parse a slot index written as hex, such as `0x2` or a full 64-digit word
    pub fn from_index_hex(value: &str) -> Result<Self, LedgerError> {
        let digits = strip_hex_prefix(value.trim());
        if digits.is_empty() {
            return Err(LedgerError::invalid_key(value, "slot index is empty"));
        }
        let digits = match digits.trim_start_matches('0') {
            "" => "0",
            significant => significant,
        };
        if digits.len() > SLOT_SIZE * 2 {
            return Err(LedgerError::invalid_key(value, "slot index exceeds 32 bytes"));
        }

        // hex::decode wants an even number of digits
        let digits = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(&digits)
            .map_err(|_| LedgerError::invalid_key(value, "slot index is not valid hex"))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SLOT_SIZE] {
        &self.0
    }

    /// Full 32-byte form, `0x` followed by 64 hex digits
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// JSON-RPC quantity form with leading zeros stripped.
    ///
    /// The underlying value is unchanged; this only affects how the slot is
    /// written on the wire. An all-zero slot renders as `0x0`.
    pub fn to_quantity_hex(&self) -> String {
        crate::amount::quantity_hex(&self.0)
    }
}

impl Display for StorageSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", &self.to_hex())
    }
}

impl Serialize for StorageSlot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for StorageSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        StorageSlot::from_index_hex(&hex).map_err(SerdeError::custom)
    }
}

/// Compute the slot holding `key`'s entry in a mapping declared at `base_slot`.
///
/// The preimage is `pad32(key) ++ pad32(base_slot)`, in that order. Swapping
/// the two words or changing the padding yields the slot of a different
/// variable.
pub fn compute_slot(base_slot: &StorageSlot, key: &Address) -> StorageSlot {
    let mut preimage = [0u8; SLOT_SIZE * 2];
    preimage[..SLOT_SIZE].copy_from_slice(&key.to_word());
    preimage[SLOT_SIZE..].copy_from_slice(base_slot.as_bytes());

    let slot = StorageSlot(keccak256(&preimage));
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("Mapping slot for {} at base {}: {}", key, base_slot, slot);
    }
    slot
}

/// Same as [`compute_slot`] but over raw inputs, validating their lengths.
///
/// `key` must be exactly 20 bytes, `base_slot` at most 32.
pub fn compute_slot_from_slices(base_slot: &[u8], key: &[u8]) -> Result<StorageSlot, LedgerError> {
    if key.len() != ADDRESS_SIZE {
        return Err(LedgerError::invalid_key(
            hex::encode(key),
            "mapping key must be a 20-byte address",
        ));
    }

    let base_slot = StorageSlot::from_slice(base_slot)?;
    let key = Address::from_slice(key)?;
    Ok(compute_slot(&base_slot, &key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha3::{Digest, Keccak256};

    fn account(byte: u8) -> Address {
        Address::new([byte; ADDRESS_SIZE])
    }

    #[test]
    fn test_compute_slot_is_deterministic() {
        let base = StorageSlot::from_index(2);
        let key = account(0x11);
        assert_eq!(compute_slot(&base, &key), compute_slot(&base, &key));
    }

    #[test]
    fn test_compute_slot_matches_solidity_layout() {
        let key: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let base = StorageSlot::from_index(5);

        let mut hasher = Keccak256::new();
        let mut key_word = [0u8; 32];
        key_word[31] = 0xaa;
        let mut base_word = [0u8; 32];
        base_word[31] = 5;
        hasher.update(key_word);
        hasher.update(base_word);
        let expected: [u8; 32] = hasher.finalize().into();

        assert_eq!(compute_slot(&base, &key).as_bytes(), &expected);
    }

    #[test]
    fn test_zero_key_zero_slot_vector() {
        let slot = compute_slot(&StorageSlot::from_index(0), &Address::zero());
        assert_eq!(
            slot.to_hex(),
            "0xad3228b676f7d3cd4284a5443f17f1962b36e491b30a40b2405849e597ba5fb5"
        );
    }

    #[test]
    fn test_transposed_preimage_gives_different_slot() {
        let base = StorageSlot::from_index(2);
        for byte in [0x01u8, 0x42, 0xfe] {
            let key = account(byte);
            let mut transposed = [0u8; 64];
            transposed[..32].copy_from_slice(base.as_bytes());
            transposed[32..].copy_from_slice(&key.to_word());

            assert_ne!(compute_slot(&base, &key).as_bytes(), &keccak256(&transposed));
        }
    }

    #[test]
    fn test_different_bases_give_different_slots() {
        let key = account(0x33);
        assert_ne!(
            compute_slot(&StorageSlot::from_index(2), &key),
            compute_slot(&StorageSlot::from_index(5), &key)
        );
    }

    #[test]
    fn test_from_slices_rejects_wrong_key_length() {
        let err = compute_slot_from_slices(&[2], &[0u8; 32]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidKey { .. }));

        let err = compute_slot_from_slices(&[2], &[0u8; 19]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidKey { .. }));
    }

    #[test]
    fn test_from_slices_rejects_oversized_base() {
        let err = compute_slot_from_slices(&[1u8; 33], &[0u8; 20]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidKey { .. }));
    }

    #[test]
    fn test_from_slices_agrees_with_typed_form() {
        let key = account(0x77);
        let from_slices = compute_slot_from_slices(&[0x02], key.as_bytes()).unwrap();
        assert_eq!(from_slices, compute_slot(&StorageSlot::from_index(2), &key));
    }

    #[test]
    fn test_index_hex_parsing() {
        assert_eq!(StorageSlot::from_index_hex("0x2").unwrap(), StorageSlot::from_index(2));
        assert_eq!(StorageSlot::from_index_hex("0x102").unwrap(), StorageSlot::from_index(0x102));
        assert!(StorageSlot::from_index_hex("0x").is_err());
        assert!(StorageSlot::from_index_hex("0xgg").is_err());
        assert!(StorageSlot::from_index_hex(&format!("0x1{}", "0".repeat(64))).is_err());
    }

    #[test]
    fn test_index_hex_ignores_leading_zeros() {
        let long = format!("0x{}2", "0".repeat(64));
        assert_eq!(StorageSlot::from_index_hex(&long).unwrap(), StorageSlot::from_index(2));
        assert_eq!(StorageSlot::from_index_hex("0x000").unwrap(), StorageSlot::from_index(0));
    }

    #[test]
    fn test_quantity_hex_strips_leading_zeros() {
        assert_eq!(StorageSlot::from_index(2).to_quantity_hex(), "0x2");
        assert_eq!(StorageSlot::from_index(0x20).to_quantity_hex(), "0x20");
        assert_eq!(StorageSlot::from_index(0x1234).to_quantity_hex(), "0x1234");
        assert_eq!(StorageSlot::new([0u8; 32]).to_quantity_hex(), "0x0");

        let full = StorageSlot::new([0xff; 32]);
        assert_eq!(full.to_quantity_hex(), full.to_hex());
        assert_eq!(full.to_hex().len(), 66);
    }
}
