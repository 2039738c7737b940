mod address;
mod hash;

pub use address::*;
pub use hash::*;

/// Strip an optional `0x`/`0X` prefix from hex text
pub(crate) fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}
