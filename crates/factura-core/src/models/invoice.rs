//! Invoice data models shared across extraction and persistence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured invoice fields extracted from recognized text.
///
/// Every field is optional except `currency`, which is always defaulted
/// by the extraction engine. Built once per document and never mutated
/// afterwards; the router applies its own defaults at write time without
/// touching this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Invoice (or purchase order) number as printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Issue date token, exactly as printed (not calendar-validated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Payment due date token, exactly as printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    /// Billed party free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_to: Option<String>,

    /// Grand total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,

    /// Net amount before tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    /// Tax amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,

    /// Tax rate in percent, when the document prints one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<Decimal>,

    /// Discount amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,

    /// Discount rate in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,

    /// Currency code. Defaulted by the extractor, never empty.
    pub currency: String,

    /// GST identification number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,

    /// Bank name from the payment block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    /// Bank branch name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,

    /// Bank account number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    /// SWIFT/BIC code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_swift_code: Option<String>,

    /// Line items, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,

    /// Candidate contact block for the billed party.
    pub client: ClientContact,
}

impl Default for ExtractedInvoice {
    fn default() -> Self {
        Self {
            invoice_number: None,
            date: None,
            due_date: None,
            bill_to: None,
            total: None,
            subtotal: None,
            tax: None,
            tax_percentage: None,
            discount: None,
            discount_percentage: None,
            currency: "EUR".to_string(),
            gstin: None,
            bank_name: None,
            branch_name: None,
            account_number: None,
            bank_swift_code: None,
            items: Vec::new(),
            client: ClientContact::default(),
        }
    }
}

/// A single line item on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description.
    pub name: String,

    /// Quantity.
    pub quantity: Decimal,

    /// Unit price.
    pub price: Decimal,
}

/// Candidate contact details for the billed party.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientContact {
    /// Party name (usually the bill-to text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ClientContact {
    /// Whether the block carries anything a resolver could match on.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// A resolved, deduplicated client identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientIdentity {
    /// Stable identifier.
    pub id: String,

    /// Client name.
    pub name: String,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A validated invoice ready for the valid store.
///
/// Carries the router's defaults: the four presentation fields are
/// always populated here even when extraction found nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Deterministic identifier (see the persistence router).
    pub id: String,

    /// Resolved client identity.
    pub client_id: String,

    /// Invoice number (defaulted when missing).
    pub invoice_number: String,

    /// Issue date token (defaulted to today when missing).
    pub date: String,

    /// Due date token (defaulted to the issue date when missing).
    pub due_date: String,

    /// Billed party (defaulted when missing).
    pub bill_to: String,

    /// Grand total. Present by construction: the router rejects
    /// documents without one.
    pub total: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,

    /// Currency code.
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_swift_code: Option<String>,

    /// Line items, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,
}

/// Outcome status for one processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The document reached the valid store.
    Success,
    /// The document failed or was routed to the invalid store.
    Error,
}

/// Per-file processing result reported by the batch coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Outcome status.
    pub status: OutcomeStatus,

    /// Original upload filename.
    pub filename: String,

    /// Extracted data, when extraction completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedInvoice>,

    /// Error message, when the file did not process cleanly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    /// Build a success outcome.
    pub fn success(filename: impl Into<String>, data: ExtractedInvoice) -> Self {
        Self {
            status: OutcomeStatus::Success,
            filename: filename.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Build an error outcome with no extracted data.
    pub fn error(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            filename: filename.into(),
            data: None,
            error: Some(error.into()),
        }
    }

    /// Build an error outcome that still carries the extracted data
    /// (documents routed to the invalid store).
    pub fn invalid(
        filename: impl Into<String>,
        data: ExtractedInvoice,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: OutcomeStatus::Error,
            filename: filename.into(),
            data: Some(data),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_invoice_has_currency() {
        let invoice = ExtractedInvoice::default();
        assert_eq!(invoice.currency, "EUR");
        assert!(invoice.total.is_none());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = FileOutcome::error("scan.tiff", "unsupported file format: tiff");
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_contact_is_empty() {
        assert!(ClientContact::default().is_empty());
        let contact = ClientContact {
            email: Some("a@a.com".to_string()),
            ..Default::default()
        };
        assert!(!contact.is_empty());
    }
}
