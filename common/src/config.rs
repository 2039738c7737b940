use crate::crypto::Address;

// Sentinel standing in for the native asset wherever a token address is expected.
// It is never a deployed contract.
pub const NATIVE_ASSET_ADDRESS: Address = Address::new([0xee; 20]);

pub const NATIVE_ASSET_SYMBOL: &str = "eth";

// 18 decimals, 10^18 smallest units per whole coin
pub const DEFAULT_DECIMALS: u8 = 18;

// Built-in token table. Balance mapping slots were read from each
// contract's verified storage layout.

// 0x6B175474E89094C44Da98b954EedeAC495271d0F
pub const DAI_ADDRESS: Address = Address::new([
    0x6b, 0x17, 0x54, 0x74, 0xe8, 0x90, 0x94, 0xc4, 0x4d, 0xa9, 0x8b, 0x95, 0x4e, 0xed, 0xea, 0xc4,
    0x95, 0x27, 0x1d, 0x0f,
]);
pub const DAI_BALANCE_SLOT: u64 = 2;

// 0xDe30da39c46104798bB5aA3fe8B9e0e1F348163F
pub const GTC_ADDRESS: Address = Address::new([
    0xde, 0x30, 0xda, 0x39, 0xc4, 0x61, 0x04, 0x79, 0x8b, 0xb5, 0xaa, 0x3f, 0xe8, 0xb9, 0xe0, 0xe1,
    0xf3, 0x48, 0x16, 0x3f,
]);
pub const GTC_BALANCE_SLOT: u64 = 5;

// 0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2
// WETH9 declares name, symbol, decimals, then balanceOf
pub const WETH_ADDRESS: Address = Address::new([
    0xc0, 0x2a, 0xaa, 0x39, 0xb2, 0x23, 0xfe, 0x8d, 0x0a, 0x0e, 0x5c, 0x4f, 0x27, 0xea, 0xd9, 0x08,
    0x3c, 0x75, 0x6c, 0xc2,
]);
pub const WETH_BALANCE_SLOT: u64 = 3;
