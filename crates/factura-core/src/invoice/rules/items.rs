//! Line item extraction.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::normalize_amount;
use crate::models::invoice::LineItem;

lazy_static! {
    // A description line followed by a quantity line and a price line.
    // The description must start with a letter so quantity/price lines
    // cannot be swallowed as names.
    static ref ITEM_TRIPLET: Regex = Regex::new(
        r"(?im)^([a-z][\w .,&'-]*)\n([0-9.]+)\n([$€]?[0-9.,]+)$"
    )
    .unwrap();
}

/// Extract line items from line-preserving text.
///
/// Items are matched as repeating name/quantity/price line triplets.
/// Entries whose quantity or price fail numeric coercion are dropped
/// silently rather than aborting extraction.
pub fn extract_line_items(lines: &str) -> Vec<LineItem> {
    let mut items = Vec::new();

    for caps in ITEM_TRIPLET.captures_iter(lines) {
        let quantity = match Decimal::from_str(caps[2].trim()) {
            Ok(q) => q,
            Err(_) => continue,
        };
        let price = match normalize_amount(&caps[3]) {
            Some(p) => p,
            None => continue,
        };

        items.push(LineItem {
            name: caps[1].trim().to_string(),
            quantity,
            price,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_triplets() {
        let text = "Consulting services\n2\n$150.00\nWidget assembly\n10.5\n3.25";
        let items = extract_line_items(text);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Consulting services");
        assert_eq!(items[0].quantity, Decimal::from_str("2").unwrap());
        assert_eq!(items[0].price, Decimal::from_str("150.00").unwrap());
        assert_eq!(items[1].quantity, Decimal::from_str("10.5").unwrap());
    }

    #[test]
    fn test_bad_quantity_dropped() {
        // "1.2.3" is not a number; the entry is skipped, the rest kept.
        let text = "Broken entry\n1.2.3\n10.00\nGood entry\n1\n5.00";
        let items = extract_line_items(text);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Good entry");
    }

    #[test]
    fn test_no_items() {
        assert!(extract_line_items("TOTAL: 12.00").is_empty());
    }
}
