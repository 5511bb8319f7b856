pub use identity::*;
pub use snapshot::*;
pub use transaction::*;
pub use transfer::*;
pub use units::*;

mod identity;
mod snapshot;
mod transaction;
mod transfer;
mod units;

/// Case-insensitive comparison of two account addresses.
pub fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Shorten an address for display: the first 10 characters, an ellipsis and
/// the last 6 characters. Addresses that are already short are returned as is.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 16 {
        return address.to_owned();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_compare_without_case() {
        assert!(same_address(
            "0xAbCdEf0000000000000000000000000000000001",
            "0xabcdef0000000000000000000000000000000001"
        ));
        assert!(!same_address("0xabc", "0xabd"));
    }

    #[test]
    fn short_address_keeps_head_and_tail() {
        assert_eq!(
            short_address("0x718dF080ddCB27Ee16B482c638f9Ed4b11e7Daf4"),
            "0x718dF080...e7Daf4"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
