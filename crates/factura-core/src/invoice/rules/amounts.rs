//! Amount string normalization.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Normalize a matched amount string into a decimal.
///
/// Everything except digits, comma, dot and minus is stripped. When
/// both a comma and a dot are present, the rightmost separator is the
/// decimal point and the other one is discarded as a thousands
/// separator. A lone comma is a decimal separator.
///
/// This is a heuristic, not a locale-aware parser: a comma-grouped
/// integer like `"1,234"` comes back as `1.234`.
pub fn normalize_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => {
            cleaned.replace('.', "").replace(',', ".")
        }
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_comma_decimal() {
        assert_eq!(normalize_amount("1234,56"), Some(dec("1234.56")));
    }

    #[test]
    fn test_dot_thousands_comma_decimal() {
        assert_eq!(normalize_amount("1.234,56"), Some(dec("1234.56")));
    }

    #[test]
    fn test_comma_thousands_dot_decimal() {
        // Rightmost separator wins, so this also lands on 1234.56.
        assert_eq!(normalize_amount("1,234.56"), Some(dec("1234.56")));
    }

    #[test]
    fn test_comma_grouped_integer_misparse() {
        // Known limitation: a comma-only grouped integer reads the
        // comma as a decimal separator.
        assert_eq!(normalize_amount("1,234"), Some(dec("1.234")));
    }

    #[test]
    fn test_currency_noise_stripped() {
        assert_eq!(normalize_amount("€ 1 234,56 TTC"), Some(dec("1234.56")));
        assert_eq!(normalize_amount("$734.33"), Some(dec("734.33")));
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(normalize_amount("n/a"), None);
        assert_eq!(normalize_amount(""), None);
    }
}
