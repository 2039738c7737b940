// Calldata for the two ERC-20 entry points the contract-call adapter needs.

use crate::{
    amount::{word_to_amount, Amount},
    crypto::{keccak256, Address},
};
use anyhow::anyhow;
use primitive_types::U256;

pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";
pub const APPROVE_SIGNATURE: &str = "approve(address,uint256)";

const WORD: usize = 32;

/// First four bytes of the keccak256 hash of a function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn encode_balance_of(account: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector(BALANCE_OF_SIGNATURE));
    data.extend_from_slice(&account.to_word());
    data
}

pub fn encode_approve(spender: &Address, amount: &U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD * 2);
    data.extend_from_slice(&selector(APPROVE_SIGNATURE));
    data.extend_from_slice(&spender.to_word());
    data.extend_from_slice(&amount.to_big_endian());
    data
}

/// Decode the first return word as an unsigned integer
pub fn decode_uint256(data: &[u8]) -> anyhow::Result<Amount> {
    if data.len() < WORD {
        return Err(anyhow!(
            "Expected a 32-byte uint256 return value, got {} bytes",
            data.len()
        ));
    }

    Ok(word_to_amount(&U256::from_big_endian(&data[..WORD])))
}

/// Decode the first return word as a bool
pub fn decode_bool(data: &[u8]) -> anyhow::Result<bool> {
    if data.len() < WORD {
        return Err(anyhow!(
            "Expected a 32-byte bool return value, got {} bytes",
            data.len()
        ));
    }

    let word = &data[..WORD];
    if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
        return Err(anyhow!("Return word 0x{} is not a bool", hex::encode(word)));
    }
    Ok(word[WORD - 1] == 1)
}
