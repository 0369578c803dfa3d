//! Unit tests for amount parsing and arithmetic helpers

use core_kernel::money::{checked_sum, clamp_non_negative, parse_amount, round_to_currency};
use core_kernel::{MoneyError, RawAmount};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod parsing {
    use super::*;

    #[test]
    fn test_parse_integer_amount() {
        assert_eq!(parse_amount("5000").unwrap(), dec!(5000));
    }

    #[test]
    fn test_parse_fractional_amount() {
        assert_eq!(parse_amount("1250.75").unwrap(), dec!(1250.75));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_amount("\t 300 \n").unwrap(), dec!(300));
    }

    #[test]
    fn test_parse_negative_amount() {
        assert_eq!(parse_amount("-20").unwrap(), dec!(-20));
    }

    #[test]
    fn test_parse_rejects_currency_symbols() {
        let result = parse_amount("KES 5,000");
        assert!(matches!(result, Err(MoneyError::InvalidAmount(ref raw)) if raw == "KES 5,000"));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(parse_amount("").is_err());
    }
}

mod raw_amounts {
    use super::*;

    #[test]
    fn test_raw_number_from_json() {
        let raw: RawAmount = serde_json::from_str("2000.5").unwrap();
        assert_eq!(raw.to_decimal().unwrap(), dec!(2000.5));
    }

    #[test]
    fn test_raw_string_from_json() {
        let raw: RawAmount = serde_json::from_str("\"3000.00\"").unwrap();
        assert_eq!(raw.to_decimal().unwrap(), dec!(3000.00));
    }

    #[test]
    fn test_raw_non_numeric_string_is_an_error() {
        let raw: RawAmount = serde_json::from_str("\"pending\"").unwrap();
        assert!(matches!(raw.to_decimal(), Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_raw_null_does_not_deserialize() {
        let result: Result<RawAmount, _> = serde_json::from_str("null");
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_from_decimal() {
        let raw = RawAmount::from(dec!(42.10));
        assert_eq!(raw.to_decimal().unwrap(), dec!(42.10));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_sum_empty_is_zero() {
        assert_eq!(checked_sum(Vec::new()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_checked_sum_adds_all() {
        let total = checked_sum(vec![dec!(3000), dec!(2500), dec!(0.50)]).unwrap();
        assert_eq!(total, dec!(5500.50));
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        assert_eq!(checked_sum(vec![Decimal::MAX, Decimal::MAX]), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(clamp_non_negative(dec!(-0.01)), Decimal::ZERO);
        assert_eq!(clamp_non_negative(dec!(0)), Decimal::ZERO);
        assert_eq!(clamp_non_negative(dec!(10)), dec!(10));
    }

    #[test]
    fn test_round_to_currency_uses_bankers_rounding() {
        assert_eq!(round_to_currency(dec!(10.125)), dec!(10.12));
        assert_eq!(round_to_currency(dec!(10.135)), dec!(10.14));
    }
}
