use crate::error::{Error, SdkResult};
use alloy::primitives::U256;
use error_stack::report;
use std::cmp::Ordering;
use uint::construct_uint;

construct_uint! {
    pub struct U512(8);
}

fn widen(value: U256) -> U512 {
    let limbs = value.as_limbs();
    U512([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
}

fn narrow(value: U512) -> SdkResult<U256> {
    if value.0[4..].iter().any(|limb| *limb != 0) {
        return Err(report!(Error::ArithmeticError(
            "Result too large to fit in U256".to_string()
        )));
    }
    Ok(U256::from_limbs([value.0[0], value.0[1], value.0[2], value.0[3]]))
}

/// Computes `floor(value * multiplier / divisor)` without intermediate overflow
pub fn mul_div(value: U256, multiplier: U256, divisor: U256) -> SdkResult<U256> {
    if divisor.is_zero() {
        return Err(report!(Error::ArithmeticError("Dividing by zero".to_string())));
    }
    narrow(widen(value) * widen(multiplier) / widen(divisor))
}

/// Compares `a_num / a_den` with `b_num / b_den` by cross-multiplication.
///
/// A zero denominator is treated as an infinitely bad ratio (always `Less`
/// unless both are zero).
pub fn cmp_ratios(a_num: U256, a_den: U256, b_num: U256, b_den: U256) -> Ordering {
    match (a_den.is_zero(), b_den.is_zero()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => (widen(a_num) * widen(b_den)).cmp(&(widen(b_num) * widen(a_den))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muldiv() {
        let a = U256::from(100_000_000_000_000_000_000_000_000u128);
        let b = U256::from(300_000_000_000_000_000_000_000_000u128);
        let c = U256::from(200_000_000_000_000_000_000_000_000u128);

        let res = mul_div(a, b, c).unwrap();
        assert_eq!(res, U256::from(150_000_000_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_muldiv_overflowing_intermediate() {
        // (2^255 * 4) / 8 = 2^254, intermediate exceeds 256 bits
        let a = U256::from(1) << 255;
        let res = mul_div(a, U256::from(4), U256::from(8)).unwrap();
        assert_eq!(res, U256::from(1) << 254);
    }

    #[test]
    fn test_muldiv_errors() {
        assert!(mul_div(U256::from(1), U256::from(1), U256::ZERO).is_err());
        assert!(mul_div(U256::MAX, U256::from(2), U256::from(1)).is_err());
    }

    #[test]
    fn test_muldiv_floors() {
        let res = mul_div(U256::from(10), U256::from(1), U256::from(3)).unwrap();
        assert_eq!(res, U256::from(3));
    }

    #[test]
    fn test_cmp_ratios() {
        let one = U256::from(1);
        let two = U256::from(2);
        let three = U256::from(3);
        assert_eq!(cmp_ratios(one, two, one, three), Ordering::Greater);
        assert_eq!(cmp_ratios(two, U256::from(4), one, two), Ordering::Equal);
        assert_eq!(cmp_ratios(one, U256::ZERO, one, two), Ordering::Less);
        assert_eq!(
            cmp_ratios(U256::MAX, U256::MAX, U256::MAX - one, U256::MAX),
            Ordering::Greater
        );
    }
}
