//! Ordered pattern cascades for invoice field extraction.
//!
//! Each table lists the accepted spellings for one field, most specific
//! first. Matching is case-insensitive; captured values keep the case
//! the document printed. Tables ending in `_RULES` are cascades in the
//! sense of [`super::first_capture`]; single patterns cover fields with
//! only one known spelling.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Invoice/purchase-order number.
    ///
    /// Order: labelled PO number (any token) -> PO number (digits) ->
    /// "INVOICE ID"/"INVOICE #" with optional INV/ prefix -> prose
    /// "invoice number" -> "INVOICE #" with dashed numbers -> colon
    /// form "Invoice number: ...".
    pub static ref INVOICE_NUMBER_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)po number[:\s]*([^\s]+)").unwrap(),
        Regex::new(r"(?i)po\s*number\s*:?\s*(\d+)").unwrap(),
        Regex::new(r"(?i)invoice\s*(?:id|#)\s*(?:inv/)?([0-9/-]+)").unwrap(),
        Regex::new(r"(?i)invoice\s*number\s*([a-zA-Z0-9-]+)").unwrap(),
        Regex::new(r"(?i)invoice\s*#\s*(\d+(?:-\d+)?)").unwrap(),
        Regex::new(r"(?i)invoice\s*number\s*:\s*([a-zA-Z0-9-]+)").unwrap(),
    ];

    /// Issue date. Month-name form first (19-Feb-1993), then numeric
    /// day-first, then year-first.
    pub static ref DATE_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:invoice\s+)?date\s*:?\s*(\d{1,2}[-/.][a-z]{3}[-/.]\d{4})").unwrap(),
        Regex::new(r"(?i)date\s*:?\s*(\d{1,2}[-/.]\d{1,2}[-/.]\d{4})").unwrap(),
        Regex::new(r"(?i)date\s*:?\s*(\d{4}[-/.]\d{1,2}[-/.]\d{1,2})").unwrap(),
    ];

    /// Due date. Same format precedence as the issue date.
    pub static ref DUE_DATE_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)due\s+date\s*:?\s*(\d{1,2}[-/.][a-z]{3}[-/.]\d{4})").unwrap(),
        Regex::new(r"(?i)due\s+date\s*:?\s*(\d{1,2}[-/.]\d{1,2}[-/.]\d{4})").unwrap(),
        Regex::new(r"(?i)due\s+date\s*:?\s*(\d{4}[-/.]\d{1,2}[-/.]\d{1,2})").unwrap(),
    ];

    /// Grand total. Currency-suffixed forms first, then currency
    /// prefixes, then bare amounts and the looser labelled variants.
    pub static ref TOTAL_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)total\s*:?\s*(\d+\.?\d*)\s*(?:eur|usd|\$)").unwrap(),
        Regex::new(r"(?i)total\s*:?\s*(\d+,\d{2})\s*(?:eur|usd|\$)").unwrap(),
        Regex::new(r"(?i)total\s*:?\s*(?:eur|usd|\$)\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)total\s*:?\s*(?:eur|usd|\$)\s*(\d+,\d{2})").unwrap(),
        Regex::new(r"(?i)total\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)total\s+in\s+words[^:]*:\s*[^:]*:\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)total\s*:\s*(?:eur|usd|\$)?\s*(\d+[.,]\d{2})").unwrap(),
        Regex::new(r"(?i)total\s*amount\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)amount\s+due\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)total[:\s]*\$?([0-9,]+\.[0-9]{2})").unwrap(),
    ];

    /// Net amount before tax.
    pub static ref SUBTOTAL_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)sub[_\s]?total\s*:\s*(\d+\.?\d*)\s*(?:eur|usd|\$)").unwrap(),
        Regex::new(r"(?i)sub[_\s]?total\s*:\s*(\d+,\d{2})\s*(?:eur|usd|\$)").unwrap(),
        Regex::new(r"(?i)sub[_\s]?total\s*:\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)sub[_\s]?total\s*:?\s*(?:eur|usd|\$)?\s*(\d+[.,]\d{2})").unwrap(),
        Regex::new(r"(?i)net\s+amount\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)sub\s*total\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)subtotal\s*amount\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)sub_total[:\s]*\$?([0-9,]+\.[0-9]{2})").unwrap(),
    ];

    /// Tax. Two-group patterns capture (rate%, amount); one-group
    /// patterns capture the amount alone.
    pub static ref TAX_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)tax:?\s*vat\s*\((\d+\.?\d*)%\)\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)tax:?\s*vat\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)gst\(%\)\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)tax:?\s*\((\d+\.?\d*)%\)\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)vat\s*\((\d+\.?\d*)%\)\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)tax\s*amount\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)gst\s*\((\d+)%\)\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)tax:?\s*vat\s*:?\s*(\d+\.?\d*)\s*(?:eur|usd|\$)").unwrap(),
        Regex::new(r"(?i)tax[:\s]*[^\d]*\$?([0-9,]+\.[0-9]{2})").unwrap(),
    ];

    /// Discount. Parenthesised rate forms first.
    pub static ref DISCOUNT_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)discount\s*\((\d+\.?\d*)%\)\s*:?\s*\(?\s*(\d+\.?\d*)\s*(?:eur|usd|\$)?\)?")
            .unwrap(),
        Regex::new(r"(?i)discount\s*\((\d+\.?\d*)%\)\s*:?\s*(\d+\.?\d*)").unwrap(),
        Regex::new(r"(?i)discount[:\s]*[^\d]*\$?([0-9,]+\.[0-9]{2})").unwrap(),
    ];

    /// Billed party. Bounded variants first (stop at a postal code,
    /// contact label or GSTIN), then progressively looser fallbacks.
    pub static ref BILL_TO_RULES: Vec<Regex> = vec![
        Regex::new(r"(?i)bill\s+to\s*:?\s*([^:\n]+?)(?:\s+\d{5}|\s+email|tel|gstin|$)").unwrap(),
        Regex::new(r"(?i)buyer\s*:?\s*([^:\n]+?)(?:\s+\d{5}|\s+email|tel|gstin|$)").unwrap(),
        Regex::new(r"(?i)bill\s+to\s*:?\s*([^:\n]+?)(?:\s+(?:\d{1,5}|email|tel|gstin)|$)").unwrap(),
        Regex::new(r"(?i)bill\s+to\s*:?\s*([^\n]+?)\s+tel:").unwrap(),
        Regex::new(r"(?i)bill\s+to\s*:?\s*([^\n]+?)\s+email:").unwrap(),
        Regex::new(r"(?i)bill\s+to\s*:?\s*([^\n]+?)\s+site:").unwrap(),
        Regex::new(r"(?i)bill to[:\s]*([^0-9]+)").unwrap(),
    ];

    /// Bank name. The whole match is the value ("State Bank of ...").
    pub static ref BANK_NAME: Regex =
        Regex::new(r"(?i)(?:state|central)\s+bank\s+of\s+([a-z]+)").unwrap();

    /// Branch name, ended by the next payment-block label.
    pub static ref BRANCH_NAME: Regex =
        Regex::new(r"(?i)branch\s+name\s+([^(]+?)\s+(?:bank|account|swift|\(|$)").unwrap();

    /// Bank account number.
    pub static ref ACCOUNT_NUMBER: Regex =
        Regex::new(r"(?i)bank\s+account\s+number\s+(\d+)").unwrap();

    /// SWIFT/BIC code.
    pub static ref SWIFT_CODE: Regex =
        Regex::new(r"(?i)bank\s+swift\s+code\s+([a-z0-9]+)").unwrap();

    /// GST identification number.
    pub static ref GSTIN: Regex = Regex::new(r"(?i)gstin\s*:?\s*([0-9a-z@]+)").unwrap();

    /// Labelled buyer email.
    pub static ref EMAIL: Regex =
        Regex::new(r"(?i)email[:\s]*([\w.-]+@[\w.-]+\.\w+)").unwrap();

    /// Labelled buyer phone.
    pub static ref PHONE: Regex =
        Regex::new(r"(?i)(?:tel|phone)[:\s]*([+\d][+\d\s-]{7,})").unwrap();

    /// Labelled buyer address, ended by the next label. Needs line
    /// boundaries, so this one runs on the line-preserving text.
    pub static ref ADDRESS: Regex =
        Regex::new(r"(?is)address[:\s]*(.*?)\n\s*(?:gstin|phone|email)").unwrap();

    /// Currency override trigger: a dollar sign or USD code anywhere.
    pub static ref USD_MARKER: Regex = Regex::new(r"\$|USD").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::first_capture;

    #[test]
    fn test_invoice_number_po_label() {
        assert_eq!(
            first_capture(&INVOICE_NUMBER_RULES, "PO Number:12345"),
            Some("12345".to_string())
        );
        assert_eq!(
            first_capture(&INVOICE_NUMBER_RULES, "INVOICE # 6508-985"),
            Some("6508-985".to_string())
        );
        assert_eq!(
            first_capture(&INVOICE_NUMBER_RULES, "INVOICE ID INV/20-11/338"),
            Some("20-11/338".to_string())
        );
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(
            first_capture(&DATE_RULES, "Invoice Date: 19-Feb-1993"),
            Some("19-Feb-1993".to_string())
        );
        assert_eq!(
            first_capture(&DATE_RULES, "Date: 19/02/1993"),
            Some("19/02/1993".to_string())
        );
        assert_eq!(
            first_capture(&DUE_DATE_RULES, "Due Date: 28-Dec-1994"),
            Some("28-Dec-1994".to_string())
        );
    }

    #[test]
    fn test_total_prefers_currency_suffixed_form() {
        let text = "TOTAL: 734.33 EUR";
        assert_eq!(
            first_capture(&TOTAL_RULES, text),
            Some("734.33".to_string())
        );
    }

    #[test]
    fn test_bill_to_stops_at_postal_code() {
        assert_eq!(
            first_capture(&BILL_TO_RULES, "Bill to: Acme Corp 12345 Email: a@a.com"),
            Some("Acme Corp".to_string())
        );
    }

    #[test]
    fn test_bank_block() {
        let text = "State Bank of India Branch Name Mumbai Central Bank Account Number 123456 Bank Swift Code SBININBB";
        assert!(BANK_NAME.find(text).is_some());
        assert_eq!(&BRANCH_NAME.captures(text).unwrap()[1], "Mumbai Central");
        assert_eq!(&ACCOUNT_NUMBER.captures(text).unwrap()[1], "123456");
        assert_eq!(&SWIFT_CODE.captures(text).unwrap()[1], "SBININBB");
    }

    #[test]
    fn test_contact_patterns() {
        assert_eq!(
            &EMAIL.captures("Email: john@example.com").unwrap()[1],
            "john@example.com"
        );
        let phone = PHONE.captures("Tel: +33 1 23 45 67 89").unwrap();
        assert!(phone[1].starts_with("+33"));
    }
}
