use alloy::primitives::U256;

use crate::error::SdkResult;
use crate::utils::uint::mul_div;

/// Protocol fee taken by the factory on every order (1%)
pub const FIXED_FEE: f64 = 0.01;

/// Number of significant digits kept from the ratio
const RATIO_SIGNIFICANT_DIGITS: i32 = 10;
/// Minimum number of decimals kept, for large ratios
const MIN_RATIO_DECIMALS: i32 = 2;
/// 10^77 is the largest power of ten that fits in a U256
const MAX_RATIO_DECIMALS: i32 = 77;

/// Multiplies an integer amount by a non integer ratio.
///
/// The ratio is turned into an integer keeping about 10 significant digits
/// (and at least 2 decimals), then applied with floor division, so float
/// representation errors never reach the resulting amount.
///
/// A ratio of exactly 1 returns `amount` untouched; a ratio <= 0 returns 0.
pub fn safe_mult(amount: U256, ratio: f64) -> SdkResult<U256> {
    if amount.is_zero() || ratio == 1.0 {
        return Ok(amount);
    }
    if ratio <= 0.0 || ratio.is_nan() {
        return Ok(U256::ZERO);
    }

    let precision = ratio_precision(ratio);
    let scaled_ratio = (ratio * 10f64.powi(precision)).floor();
    let Some(factor) = U256::from(10u64).checked_pow(U256::from(precision as u64)) else {
        return Ok(U256::ZERO);
    };

    mul_div(amount, U256::from(scaled_ratio as u128), factor)
}

fn ratio_precision(ratio: f64) -> i32 {
    // rounds half up
    let magnitude = (ratio.log10() + 0.5).floor() as i32;
    (RATIO_SIGNIFICANT_DIGITS - magnitude).clamp(MIN_RATIO_DECIMALS, MAX_RATIO_DECIMALS)
}

/// Amount left once the protocol fee is deducted
pub fn remove_fees(amount: U256) -> SdkResult<U256> {
    safe_mult(amount, 1.0 - FIXED_FEE)
}

/// Amount needed so that `amount` is left once the protocol fee is deducted
pub fn add_fees(amount: U256) -> SdkResult<U256> {
    safe_mult(amount, 1.0 / (1.0 - FIXED_FEE))
}
