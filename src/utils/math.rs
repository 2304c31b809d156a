use num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::Zero;

/// Fractional digits kept on derived token prices.
pub const PRICE_SCALE: i64 = 36;

/// Fractional digits kept on USD values.
pub const USD_SCALE: i64 = 18;

/// Fractional digits kept on percentages.
pub const PERCENT_SCALE: i64 = 8;

/// Truncate toward zero at the given number of fractional digits.
///
/// Products go through this; quotients go through [`ratio`] so they are
/// never rounded up either.
pub fn truncate(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::Down).normalized()
}

/// Exact integer ratio, truncated at `scale` fractional digits.
///
/// The quotient is taken on integers, so no intermediate rounding happens.
pub fn ratio(numerator: &BigInt, denominator: &BigInt, scale: i64) -> Option<BigDecimal> {
    if denominator.is_zero() || scale < 0 {
        return None;
    }

    let shifted = numerator * pow10(u32::try_from(scale).ok()?);
    // BigInt division truncates toward zero
    let quotient = shifted / denominator;
    Some(BigDecimal::new(quotient, scale).normalized())
}

/// `numerator / denominator` for decimals, truncated at `scale`.
pub fn decimal_ratio(numerator: &BigDecimal, denominator: &BigDecimal, scale: i64) -> Option<BigDecimal> {
    let (n, n_scale) = numerator.as_bigint_and_exponent();
    let (d, d_scale) = denominator.as_bigint_and_exponent();

    // n / 10^n_scale / (d / 10^d_scale) = n * 10^d_scale / (d * 10^n_scale)
    let shift = pow10(u32::try_from((d_scale - n_scale).unsigned_abs()).ok()?);
    if d_scale >= n_scale {
        ratio(&(n * shift), &d, scale)
    } else {
        ratio(&n, &(d * shift), scale)
    }
}

/// Calculate percentage change between two values
pub fn percentage_change(old_value: &BigDecimal, new_value: &BigDecimal) -> Result<BigDecimal, String> {
    if old_value.is_zero() {
        return Err("Cannot calculate percentage change with zero base value".to_string());
    }

    let scaled_change = (new_value - old_value) * BigDecimal::from(100);
    decimal_ratio(&scaled_change, old_value, PERCENT_SCALE)
        .ok_or_else(|| "Percentage change out of range".to_string())
}

/// Multiply two optional quantities, truncating at `scale`.
pub fn checked_product(a: Option<&BigDecimal>, b: Option<&BigDecimal>, scale: i64) -> Option<BigDecimal> {
    match (a, b) {
        (Some(a), Some(b)) => Some(truncate(&(a * b), scale)),
        _ => None,
    }
}

/// 10^exp as a big integer.
pub fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp as usize)
}
