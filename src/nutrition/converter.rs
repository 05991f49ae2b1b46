//! Provider value conversions
//!
//! Helpers for turning nutrition-database fields into ingredient-line values.

/// Kilojoules per kilocalorie
pub const KJ_PER_KCAL: f64 = 4.184;

/// Grams assumed when a provider gives no usable serving size
pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// Convert an energy value in kJ to kcal
pub fn kj_to_kcal(kj: f64) -> f64 {
    kj / KJ_PER_KCAL
}

/// Find the first gram amount in a serving-size string
///
/// Examples:
/// - "30g" -> Some(30.0)
/// - "1 bar (45 G)" -> Some(45.0)
/// - "2 slices, 57.5 g" -> Some(57.5)
/// - "1 cup" -> None
pub fn parse_serving_grams(serving_size: &str) -> Option<f64> {
    let lower = serving_size.to_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        // Decimal part only counts with a digit after the point
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        let end = i;

        let mut j = end;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j < bytes.len() && bytes[j] == b'g' {
            if let Ok(value) = lower[start..end].parse::<f64>() {
                return Some(value);
            }
        }
    }

    None
}

/// Serving grams, falling back to 100g when absent or unparseable
pub fn serving_grams_or_default(serving_size: Option<&str>) -> f64 {
    serving_size
        .and_then(parse_serving_grams)
        .unwrap_or(DEFAULT_SERVING_GRAMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kj_to_kcal() {
        assert!((kj_to_kcal(418.4) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_serving_grams() {
        assert_eq!(parse_serving_grams("30g"), Some(30.0));
        assert_eq!(parse_serving_grams("1 bar (45 G)"), Some(45.0));
        assert_eq!(parse_serving_grams("2 slices, 57.5 g"), Some(57.5));
        assert_eq!(parse_serving_grams("250 ml"), None);
        assert_eq!(parse_serving_grams("1 cup"), None);
    }

    #[test]
    fn test_serving_default() {
        assert_eq!(serving_grams_or_default(None), 100.0);
        assert_eq!(serving_grams_or_default(Some("a pinch")), 100.0);
        assert_eq!(serving_grams_or_default(Some("40 g")), 40.0);
    }
}
