use crate::error::{Error, SdkResult};
use crate::utils::uint::mul_div;
use alloy::primitives::U256;
use error_stack::{ResultExt, report};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn decimal_string_to_u256(s: &str) -> SdkResult<U256> {
    U256::from_str(s.trim())
        .change_context(Error::ParseError)
        .attach_printable(format!("Invalid integer amount: {s}"))
}

/// Parses a human readable decimal (e.g. `"1.25"`) into an integer scaled by
/// `10^decimals`. Extra fraction digits are truncated.
pub fn decimal_string_to_scaled_u256(s: &str, decimals: u8) -> SdkResult<U256> {
    let s = s.trim();
    let (integer, fraction) = s.split_once('.').unwrap_or((s, ""));
    let decimals = decimals as usize;
    let mut digits = String::with_capacity(integer.len() + decimals);
    digits.push_str(if integer.is_empty() { "0" } else { integer });
    digits.extend(fraction.chars().chain(std::iter::repeat('0')).take(decimals));
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(report!(Error::ParseError).attach_printable(format!("Invalid decimal: {s}")));
    }
    decimal_string_to_u256(&digits)
}

/// Raw-unit ratio `buy / sell` multiplied by `10^sell_decimals`.
/// Zero when nothing is sold.
pub fn normalized_price(buy: U256, sell: U256, sell_decimals: u8) -> SdkResult<U256> {
    if sell.is_zero() {
        return Ok(U256::ZERO);
    }
    let scale = U256::from(10u64).pow(U256::from(sell_decimals));
    mul_div(buy, scale, sell)
}

/// `src_usd / dest_usd - 1`, as reported by aggregators giving USD valuations
pub fn price_impact_from_usd(src_usd: &str, dest_usd: &str) -> SdkResult<Decimal> {
    let src = Decimal::from_str(src_usd)
        .change_context(Error::ParseError)
        .attach_printable(format!("Invalid USD value: {src_usd}"))?;
    let dest = Decimal::from_str(dest_usd)
        .change_context(Error::ParseError)
        .attach_printable(format!("Invalid USD value: {dest_usd}"))?;
    if dest.is_zero() {
        return Err(report!(Error::ParseError).attach_printable("Destination USD value is zero"));
    }
    Ok(src / dest - Decimal::ONE)
}
