//! Field extraction engine driving the pattern cascades.

use regex::Regex;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{ClientContact, ExtractedInvoice};

use super::rules::{
    extract_line_items, first_amount, first_amount_with_rate, first_capture,
    patterns::*,
};

/// Fold typographic glyph variants into their ASCII forms.
fn fold_glyphs(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            _ => c,
        })
        .collect()
}

/// Normalize recognized text for scalar field matching: glyph folding
/// and whitespace collapse. Case is preserved; the cascades match
/// case-insensitively.
pub fn normalize_text(text: &str) -> String {
    fold_glyphs(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize recognized text while keeping line boundaries, for the
/// patterns that need them (line items, address block). Blank lines are
/// dropped and each surviving line has its inner whitespace collapsed.
pub fn normalize_lines(text: &str) -> String {
    fold_glyphs(text)
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn capture_one(rule: &Regex, text: &str) -> Option<String> {
    rule.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Extraction engine turning recognized text into a typed invoice.
///
/// Every field runs its own pattern cascade independently; a field the
/// document does not carry simply stays `None`. The engine itself never
/// fails — downstream routing decides what an incomplete record means.
pub struct InvoiceExtractor {
    default_currency: String,
}

impl InvoiceExtractor {
    /// Create an extractor with the default currency.
    pub fn new() -> Self {
        Self {
            default_currency: "EUR".to_string(),
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            default_currency: config.default_currency.clone(),
        }
    }

    /// Extract a typed invoice record from recognized text.
    pub fn extract(&self, text: &str) -> ExtractedInvoice {
        let flat = normalize_text(text);
        let lines = normalize_lines(text);

        debug!("extracting fields from {} characters of text", flat.len());

        let invoice_number = first_capture(&INVOICE_NUMBER_RULES, &flat);
        let date = first_capture(&DATE_RULES, &flat);
        let due_date = first_capture(&DUE_DATE_RULES, &flat);
        let bill_to = first_capture(&BILL_TO_RULES, &flat);

        let total = first_amount(&TOTAL_RULES, &flat);
        let subtotal = first_amount(&SUBTOTAL_RULES, &flat);
        let (tax_percentage, tax) = first_amount_with_rate(&TAX_RULES, &flat);
        let (discount_percentage, discount) = first_amount_with_rate(&DISCOUNT_RULES, &flat);

        let gstin = capture_one(&GSTIN, &flat);
        let bank_name = BANK_NAME.find(&flat).map(|m| m.as_str().to_string());
        let branch_name = capture_one(&BRANCH_NAME, &flat);
        let account_number = capture_one(&ACCOUNT_NUMBER, &flat);
        let bank_swift_code = capture_one(&SWIFT_CODE, &flat);

        let email = capture_one(&EMAIL, &flat);
        let phone = capture_one(&PHONE, &flat);
        // The address block ends at the next label's line, so it runs
        // against the line-preserving text.
        let address = capture_one(&ADDRESS, &lines);

        let items = extract_line_items(&lines);

        let currency = if USD_MARKER.is_match(&flat) {
            "USD".to_string()
        } else {
            self.default_currency.clone()
        };

        if total.is_none() {
            debug!("no total found in document text");
        }

        let client = ClientContact {
            name: bill_to.clone(),
            email,
            phone,
            address,
        };

        ExtractedInvoice {
            invoice_number,
            date,
            due_date,
            bill_to,
            total,
            subtotal,
            tax,
            tax_percentage,
            discount,
            discount_percentage,
            currency,
            gstin,
            bank_name,
            branch_name,
            account_number,
            bank_swift_code,
            items,
            client,
        }
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_extract_basic_invoice() {
        let text = r#"
            INVOICE # 6508-985
            Invoice Date: 19-Feb-1993
            Due Date: 05-Mar-1993

            Bill to: Acme Corp 12345 Email: billing@acme.example

            TOTAL: 753.48 EUR
            SUB_TOTAL: 725.30 EUR
            TAX:VAT (3.89%): 28.18
        "#;

        let invoice = InvoiceExtractor::new().extract(text);

        assert_eq!(invoice.invoice_number, Some("6508-985".to_string()));
        assert_eq!(invoice.date, Some("19-Feb-1993".to_string()));
        assert_eq!(invoice.due_date, Some("05-Mar-1993".to_string()));
        assert_eq!(invoice.bill_to, Some("Acme Corp".to_string()));
        assert_eq!(invoice.total, Some(dec("753.48")));
        assert_eq!(invoice.subtotal, Some(dec("725.30")));
        assert_eq!(invoice.tax, Some(dec("28.18")));
        assert_eq!(invoice.tax_percentage, Some(dec("3.89")));
        assert_eq!(invoice.currency, "EUR");
        assert_eq!(
            invoice.client.email,
            Some("billing@acme.example".to_string())
        );
    }

    #[test]
    fn test_currency_override_on_dollar_sign() {
        let invoice = InvoiceExtractor::new().extract("TOTAL: $734.33");
        assert_eq!(invoice.currency, "USD");
        assert_eq!(invoice.total, Some(dec("734.33")));

        let invoice = InvoiceExtractor::new().extract("TOTAL: 734.33 USD");
        assert_eq!(invoice.currency, "USD");
    }

    #[test]
    fn test_currency_defaults_without_marker() {
        let invoice = InvoiceExtractor::new().extract("TOTAL: 100.00");
        assert_eq!(invoice.currency, "EUR");
    }

    #[test]
    fn test_missing_fields_stay_none() {
        let invoice = InvoiceExtractor::new().extract("a receipt with nothing on it");
        assert!(invoice.invoice_number.is_none());
        assert!(invoice.total.is_none());
        assert!(invoice.items.is_empty());
    }

    #[test]
    fn test_line_items_survive_flattening() {
        let text = "Consulting services\n2\n$150.00\nTOTAL: $300.00";
        let invoice = InvoiceExtractor::new().extract(text);

        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.items[0].name, "Consulting services");
        assert_eq!(invoice.items[0].quantity, dec("2"));
        assert_eq!(invoice.items[0].price, dec("150.00"));
    }

    #[test]
    fn test_contact_block() {
        let text = "Bill to: Acme Corp\nAddress: 1 Main Street\nSuite 4\nEmail: a@a.com\nTel: +1 555-0100";
        let invoice = InvoiceExtractor::new().extract(text);

        assert_eq!(invoice.client.email, Some("a@a.com".to_string()));
        assert_eq!(invoice.client.phone, Some("+1 555-0100".to_string()));
        assert_eq!(
            invoice.client.address,
            Some("1 Main Street\nSuite 4".to_string())
        );
        assert_eq!(invoice.client.name, invoice.bill_to);
    }

    #[test]
    fn test_normalize_text_folds_glyphs_and_whitespace() {
        assert_eq!(
            normalize_text("total\u{2014}due:\n  12\u{2019}  "),
            "total-due: 12'"
        );
    }
}
