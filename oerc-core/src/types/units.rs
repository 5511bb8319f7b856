use ethers_core::types::U256;

/// Decimal count of the OERC token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Symbol shown when a record does not carry one.
pub const TOKEN_SYMBOL: &str = "OERC";

/// Render a raw integer token amount as a decimal string.
///
/// Trailing zeros of the fractional part are trimmed, keeping at least one
/// digit, so `1500000000000000000` at 18 decimals reads `1.5` and zero reads
/// `0.0`.
pub fn format_units(raw: U256, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    // 10^78 does not fit in a U256; any larger decimal count is nonsensical.
    let decimals = decimals.min(77);
    let base = U256::exp10(decimals as usize);
    let (whole, fraction) = raw.div_mod(base);
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let trimmed = fraction.trim_end_matches('0');
    let fraction = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{whole}.{fraction}")
}

/// Parse an unsigned base-10 integer, as found in the `value` field of a
/// transaction record.
pub fn parse_raw_amount(value: &str) -> Option<U256> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_dec_str(value).ok()
}
