//! Decimal rounding
//!
//! Every displayed figure in the planner goes through [`round_to`].

/// Round `value` to `decimals` places, ties away from zero.
///
/// The decimal shift is done on the value's shortest decimal representation
/// (`"1.005"` becomes `"1.005e2"`, i.e. exactly 100.5) rather than by
/// multiplying by a power of ten, so inputs that print as an exact tie round
/// as a person would expect: `round_to(1.005, 2) == 1.01`.
///
/// Non-finite values are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let scale = 10f64.powi(decimals as i32);

    let shifted = format!("{}e{}", value, decimals)
        .parse::<f64>()
        .unwrap_or(value * scale);
    let rounded = shifted.round();

    format!("{}e-{}", rounded, decimals)
        .parse::<f64>()
        .unwrap_or(rounded / scale)
}

/// Format a rounded figure without a trailing `.0`
pub fn format_number(value: f64, decimals: u32) -> String {
    let rounded = round_to(value, decimals);
    // Avoid printing "-0"
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_tie_from_decimal_representation() {
        assert_eq!(round_to(1.005, 2), 1.01);
        assert_eq!(round_to(1.255, 2), 1.26);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(-1.005, 2), -1.01);
    }

    #[test]
    fn test_round_whole_numbers() {
        assert_eq!(round_to(78.0, 0), 78.0);
        assert_eq!(round_to(77.9999, 0), 78.0);
        assert_eq!(round_to(249.96, 1), 250.0);
    }

    #[test]
    fn test_round_tiny_and_large_values() {
        assert_eq!(round_to(0.0000001, 2), 0.0);
        assert_eq!(round_to(123456789.123, 1), 123456789.1);
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(250.0, 1), "250");
        assert_eq!(format_number(12.46, 1), "12.5");
        assert_eq!(format_number(-0.01, 1), "0");
    }
}
