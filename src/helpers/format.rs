use ethers_core::types::U256;
use ethers_core::utils::{parse_units, ConversionError, ParseUnits};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("amount must not be negative")]
    Negative,
}

/// Whole-unit balance: no group separators, no fractional digits, halves round up.
pub fn format_balance(balance: U256, decimals: u8) -> String {
    let divisor = match U256::from(10u64).checked_pow(U256::from(decimals)) {
        Some(d) => d,
        // 10^decimals exceeds U256::MAX, so the balance is less than half a unit.
        None => return "0".to_string(),
    };
    let whole = balance / divisor;
    let remainder = balance % divisor;
    let rounded = if remainder >= divisor - remainder {
        whole.saturating_add(U256::one())
    } else {
        whole
    };
    rounded.to_string()
}

/// Parses a human amount such as `"12.5"` into base units.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, AmountError> {
    match parse_units(input.trim(), decimals as u32)? {
        ParseUnits::U256(n) => Ok(n),
        ParseUnits::I256(n) if n.is_negative() => Err(AmountError::Negative),
        // "-0" parses as a signed zero
        ParseUnits::I256(n) => Ok(n.into_raw()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_fraction_or_separators() {
        let raw = U256::from_dec_str("1234400000000000000000").unwrap();
        assert_eq!(format_balance(raw, 18), "1234");

        let big = U256::from_dec_str("1234567000000000000000000").unwrap();
        assert_eq!(format_balance(big, 18), "1234567");
    }

    #[test]
    fn rounds_half_up() {
        let half = U256::from_dec_str("1234500000000000000000").unwrap();
        assert_eq!(format_balance(half, 18), "1235");
        assert_eq!(format_balance(U256::from(1_499u64), 3), "1");
        assert_eq!(format_balance(U256::from(1_500u64), 3), "2");
    }

    #[test]
    fn zero_decimals_is_identity() {
        assert_eq!(format_balance(U256::from(42u64), 0), "42");
        assert_eq!(format_balance(U256::zero(), 18), "0");
    }

    #[test]
    fn huge_decimals_do_not_overflow() {
        assert_eq!(format_balance(U256::MAX, 255), "0");
        assert_eq!(format_balance(U256::from(7u64), 77), "0");
    }

    #[test]
    fn parses_human_amounts() {
        assert_eq!(
            parse_amount("1.5", 18).unwrap(),
            U256::from_dec_str("1500000000000000000").unwrap()
        );
        assert_eq!(parse_amount(" 3 ", 6).unwrap(), U256::from(3_000_000u64));
        assert!(parse_amount("abc", 18).is_err());
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(matches!(parse_amount("-1", 18), Err(AmountError::Negative)));
        assert!(matches!(parse_amount(" -0.5 ", 6), Err(AmountError::Negative)));
        assert_eq!(parse_amount("-0", 18).unwrap(), U256::zero());
    }
}
