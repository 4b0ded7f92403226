//! Integer money helpers. Every derivation rounds to the nearest unit,
//! halves away from zero, so repeated steps never drift by truncation.

/// Largest magnitude accepted from generator output or user input.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// `numerator / denominator` rounded to the nearest integer.
/// Returns 0 when `denominator` is 0.
pub fn div_round(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    let negative = (numerator < 0) != (denominator < 0);
    let (n, d) = (numerator.unsigned_abs(), denominator.unsigned_abs());
    let q = ((n + d / 2) / d) as i64;
    if negative { -q } else { q }
}

/// `value * numerator / denominator`, rounded, computed in 128 bits and
/// saturated back into `i64`. Returns 0 when `denominator` is 0.
pub fn scale_round(value: i64, numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    let n = value as i128 * numerator as i128;
    let d = denominator as i128;
    let q = (n.abs() + d.abs() / 2) / d.abs();
    let q = if (n < 0) != (d < 0) { -q } else { q };
    q.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Saturating sum of amounts.
pub fn sum_amounts<I: IntoIterator<Item = i64>>(amounts: I) -> i64 {
    amounts.into_iter().fold(0, i64::saturating_add)
}

/// Round an external amount; non-finite values and magnitudes beyond
/// `MAX_AMOUNT` become `None`.
pub fn round_amount(value: f64) -> Option<i64> {
    let rounded = value.round();
    (rounded.is_finite() && rounded.abs() <= MAX_AMOUNT as f64).then_some(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(div_round(300_000, 2), 150_000);
        assert_eq!(div_round(100_000, 3), 33_333);
        assert_eq!(div_round(5, 2), 3);
        assert_eq!(div_round(-5, 2), -3);
        assert_eq!(div_round(7, 0), 0);
    }

    #[test]
    fn round_amount_rejects_nan_and_huge_values() {
        assert_eq!(round_amount(1499.5), Some(1500));
        assert_eq!(round_amount(f64::NAN), None);
        assert_eq!(round_amount(9e18), None);
        assert_eq!(round_amount(-1e19), None);
        assert_eq!(round_amount(MAX_AMOUNT as f64), Some(MAX_AMOUNT));
    }

    #[test]
    fn scale_round_does_not_overflow() {
        assert_eq!(scale_round(300_000, 500_000, 700_000), 214_286);
        assert_eq!(scale_round(MAX_AMOUNT, MAX_AMOUNT, MAX_AMOUNT), MAX_AMOUNT);
        assert_eq!(scale_round(-5, 1, 2), -3);
        assert_eq!(scale_round(7, 3, 0), 0);
    }

    #[test]
    fn sums_saturate() {
        assert_eq!(sum_amounts([1, 2, 3]), 6);
        assert_eq!(sum_amounts([i64::MAX, i64::MAX]), i64::MAX);
    }
}
