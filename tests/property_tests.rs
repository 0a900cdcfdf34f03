use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use canteen_api::quantize;

proptest! {
    /// format(validate(s)) then validate again yields the identical value.
    #[test]
    fn quantity_round_trips_exactly(int_part in 1u32..=9999, frac in 0u32..=999) {
        let raw = format!("{int_part}.{frac:03}");
        let parsed = quantize::parse_quantity(&raw, dec!(10000), "qty").unwrap();
        let formatted = quantize::format_quantity(parsed);
        let reparsed = quantize::parse_quantity(&formatted, dec!(10000), "qty").unwrap();

        prop_assert_eq!(parsed, reparsed);
        prop_assert_eq!(formatted.clone(), quantize::format_quantity(reparsed));
        prop_assert!(!formatted.contains(['e', 'E']));
    }

    #[test]
    fn money_round_trips_exactly(int_part in 1u32..=99999, cents in 0u32..=99) {
        let raw = format!("{int_part}.{cents:02}");
        let parsed = quantize::parse_money(&raw, dec!(100000), "amount").unwrap();
        let formatted = quantize::format_money(parsed);
        let reparsed = quantize::parse_money(&formatted, dec!(100000), "amount").unwrap();

        prop_assert_eq!(parsed, reparsed);
        prop_assert_eq!(formatted, raw);
    }

    /// Exponential notation is rejected whatever value it would denote.
    #[test]
    fn exponent_markers_are_always_rejected(mantissa in 1u32..=999, exp in 0u32..=9) {
        let raw = format!("{mantissa}e{exp}");
        prop_assert!(quantize::parse_money(&raw, Decimal::MAX, "amount").is_err());
    }

    /// Quantization is idempotent at every scale it is used with.
    #[test]
    fn quantization_is_idempotent(units in 0i64..=10_000_000, scale in 0u32..=3) {
        let value = Decimal::new(units, 4);
        let once = quantize::quantize(value, scale);
        prop_assert_eq!(once, quantize::quantize(once, scale));
    }
}
