//! Decimal validation and quantization.
//!
//! Every externally supplied money or quantity string enters the system
//! through [`parse_amount`] (usually via the [`parse_money`] /
//! [`parse_quantity`] wrappers), and every money or quantity value leaves it
//! through [`format_money`] / [`format_quantity`]. Both directions share one
//! quantization rule, so formatting a validated value and re-validating the
//! result is exact.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::errors::ServiceError;

/// Money values carry two fractional digits.
pub const MONEY_SCALE: u32 = 2;
/// Physical quantities carry three fractional digits.
pub const QUANTITY_SCALE: u32 = 3;

/// Rounds half-up to `scale` digits and pins the result to exactly that
/// scale, so `12.3` formats as `12.30` at money scale.
pub fn quantize(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

/// Validates a raw user-supplied amount string.
///
/// Trims whitespace, accepts a comma decimal separator, refuses exponential
/// notation outright, and requires an exact decimal in `(0, max]`. The result
/// is quantized to `scale` digits, round half up.
pub fn parse_amount(
    raw: &str,
    max: Decimal,
    scale: u32,
    field: &str,
) -> Result<Decimal, ServiceError> {
    let cleaned = raw.trim().replace(',', ".");

    if cleaned.is_empty() {
        return Err(ServiceError::validation(field, "value is required"));
    }

    // Exponential notation is never acceptable input, whatever magnitude it
    // would denote.
    if cleaned.contains(['e', 'E']) {
        return Err(ServiceError::validation(
            field,
            "exponential notation is not allowed",
        ));
    }

    let value = Decimal::from_str(&cleaned)
        .map_err(|_| ServiceError::validation(field, format!("'{}' is not a valid number", raw)))?;

    if value <= Decimal::ZERO {
        return Err(ServiceError::validation(
            field,
            "value must be greater than zero",
        ));
    }

    if value > max {
        return Err(ServiceError::validation(
            field,
            format!("value must not exceed {}", max),
        ));
    }

    Ok(quantize(value, scale))
}

/// Validates a monetary amount against `max`.
pub fn parse_money(raw: &str, max: Decimal, field: &str) -> Result<Decimal, ServiceError> {
    parse_amount(raw, max, MONEY_SCALE, field)
}

/// Validates a physical quantity against `max`.
pub fn parse_quantity(raw: &str, max: Decimal, field: &str) -> Result<Decimal, ServiceError> {
    parse_amount(raw, max, QUANTITY_SCALE, field)
}

/// Canonical money rendering: always two fractional digits, never
/// scientific notation.
pub fn format_money(value: Decimal) -> String {
    quantize(value, MONEY_SCALE).to_string()
}

/// Canonical quantity rendering: always three fractional digits.
pub fn format_quantity(value: Decimal) -> String {
    quantize(value, QUANTITY_SCALE).to_string()
}
