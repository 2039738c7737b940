/// Shorten a `0x`-prefixed 42-character address to `0x1234...abcd`
pub fn format_address(address: &str) -> Option<String> {
    if address.len() != 42 || !address.is_ascii() {
        return None;
    }
    Some(format!("{}...{}", &address[..6], &address[38..]))
}
