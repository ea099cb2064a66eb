//! Rule-based field extraction.
//!
//! Every invoice field is extracted by an ordered list of patterns
//! tried strictly in table order; the first pattern that matches wins
//! and the rest are never consulted. The relative order inside each
//! table is a versioned contract: reordering changes which layout an
//! ambiguous document resolves to.

pub mod amounts;
pub mod items;
pub mod patterns;

pub use amounts::normalize_amount;
pub use items::extract_line_items;

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Return the first capture produced by an ordered pattern cascade.
pub fn first_capture(rules: &[Regex], text: &str) -> Option<String> {
    for rule in rules {
        if let Some(caps) = rule.captures(text) {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().trim().to_string());
            }
        }
    }
    None
}

/// Return the first amount produced by an ordered pattern cascade.
///
/// A pattern whose capture fails numeric normalization does not win;
/// the cascade moves on to the next pattern.
pub fn first_amount(rules: &[Regex], text: &str) -> Option<Decimal> {
    for rule in rules {
        if let Some(caps) = rule.captures(text) {
            if let Some(value) = caps.get(1).and_then(|m| normalize_amount(m.as_str())) {
                return Some(value);
            }
        }
    }
    None
}

/// Return the first (rate, amount) pair produced by a cascade whose
/// patterns carry either one capture group (amount only) or two
/// (percentage rate, then amount).
pub fn first_amount_with_rate(rules: &[Regex], text: &str) -> (Option<Decimal>, Option<Decimal>) {
    for rule in rules {
        if let Some(caps) = rule.captures(text) {
            if caps.len() > 2 {
                let rate = caps.get(1).and_then(|m| Decimal::from_str(m.as_str()).ok());
                if let Some(value) = caps.get(2).and_then(|m| normalize_amount(m.as_str())) {
                    return (rate, Some(value));
                }
            } else if let Some(value) = caps.get(1).and_then(|m| normalize_amount(m.as_str())) {
                return (None, Some(value));
            }
        }
    }
    (None, None)
}
