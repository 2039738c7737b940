use sha3::{Digest, Keccak256};

pub const HASH_SIZE: usize = 32; // 32 bytes / 256 bits

// Hash a byte array using the EVM keccak256 algorithm (single pass)
#[inline(always)]
pub fn keccak256(value: &[u8]) -> [u8; HASH_SIZE] {
    Keccak256::digest(value).into()
}
