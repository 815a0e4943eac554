//! Presentation formatting for metric values.
//!
//! Kept apart from metric computation: the engine produces raw numbers,
//! and only card display strings pass through here.

/// Round to two decimals, the resolution every money/ratio card reports at.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Compact Indian-notation amount: lakhs as `L`, thousands as `K`.
pub fn compact(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    if magnitude >= 100_000.0 {
        format!("{}{:.2}L", sign, magnitude / 100_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{}{:.2}K", sign, magnitude / 1_000.0)
    } else {
        format!("{}{:.2}", sign, magnitude)
    }
}

/// Percentage display for a value already expressed in percent units.
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_truncates_to_currency_resolution() {
        assert_eq!(round2(123.456), 123.46);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(f64::INFINITY), 0.0);
    }

    #[test]
    fn compact_uses_lakh_and_thousand_units() {
        assert_eq!(compact(123456.0), "1.23L");
        assert_eq!(compact(100000.0), "1.00L");
        assert_eq!(compact(2500.0), "2.50K");
        assert_eq!(compact(999.99), "999.99");
        assert_eq!(compact(0.0), "0.00");
    }

    #[test]
    fn compact_keeps_sign_for_losses() {
        assert_eq!(compact(-4500.0), "-4.50K");
        assert_eq!(compact(-250000.0), "-2.50L");
    }

    #[test]
    fn percent_formats_two_decimals() {
        assert_eq!(percent(41.666), "41.67%");
        assert_eq!(percent(0.0), "0.00%");
    }
}
