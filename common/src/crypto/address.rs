use super::strip_hex_prefix;
use crate::error::LedgerError;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    convert::TryInto,
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

pub const ADDRESS_SIZE: usize = 20; // 20 bytes / 160 bits

/// Account or contract identifier on the simulated ledger
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn zero() -> Self {
        Address::new([0; ADDRESS_SIZE])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, LedgerError> {
        let bytes: [u8; ADDRESS_SIZE] = bytes.try_into().map_err(|_| {
            LedgerError::invalid_key(hex::encode(bytes), "address must be 20 bytes")
        })?;
        Ok(Address(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; ADDRESS_SIZE] {
        self.0
    }

    /// Left-pad to a full 32-byte word, as the EVM ABI encodes an address
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - ADDRESS_SIZE..].copy_from_slice(&self.0);
        word
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        if digits.len() != ADDRESS_SIZE * 2 {
            return Err(LedgerError::invalid_key(s, "address must be 40 hex digits"));
        }

        let bytes = hex::decode(digits)
            .map_err(|_| LedgerError::invalid_key(s, "address is not valid hex"))?;
        Self::from_slice(&bytes)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", &self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(SerdeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_case_address() {
        let address: Address = "0x6B175474E89094C44Da98b954EedeAC495271d0F".parse().unwrap();
        assert_eq!(
            address.to_string(),
            "0x6b175474e89094c44da98b954eedeac495271d0f"
        );
    }

    #[test]
    fn test_parse_without_prefix() {
        let with: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let without: Address = "00000000000000000000000000000000000000aa".parse().unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_wrong_length_is_invalid_key() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidKey { .. }));

        let err = Address::from_slice(&[1u8; 32]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidKey { .. }));
    }

    #[test]
    fn test_non_hex_is_invalid_key() {
        let err = "0xzz00000000000000000000000000000000000000"
            .parse::<Address>()
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidKey { .. }));
    }

    #[test]
    fn test_to_word_left_pads() {
        let address = Address::new([0xab; ADDRESS_SIZE]);
        let word = address.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0xab; ADDRESS_SIZE]);
    }

    #[test]
    fn test_serde_round_trip_as_string() {
        let address = Address::new([7u8; ADDRESS_SIZE]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", address.to_hex()));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }
}
