//! Validation and persistence routing.
//!
//! Every routed document lands in exactly one of the two stores. The
//! invalid store doubles as the catch-all: when the valid-store write
//! itself fails, the same data is re-routed there with a wrapped
//! message instead of being dropped.

use std::sync::Arc;

use chrono::Local;
use sha2::{Digest, Sha256};
use tracing::{error, warn};

use crate::invoice::normalize_text;
use crate::models::invoice::{ExtractedInvoice, InvoiceRecord};

use super::{ClientResolver, Database};

/// Where a routed document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResult {
    /// Written to the valid store under the given id.
    Stored { id: String },
    /// Written to the invalid store with the given message.
    Invalid { error: String },
}

/// Compute the stable id for a document.
///
/// A numbered invoice hashes its number, so reprocessing it always
/// lands on the same row. An un-numbered document hashes its normalized
/// recognized text instead, which keeps resubmission idempotent too.
pub fn invoice_id(invoice_number: Option<&str>, source_text: &str) -> String {
    let mut hasher = Sha256::new();
    match invoice_number {
        Some(number) => hasher.update(number.as_bytes()),
        None => hasher.update(normalize_text(source_text).as_bytes()),
    }
    hex::encode(hasher.finalize())
}

/// Routes extracted invoices into the valid or invalid store.
pub struct PersistenceRouter {
    db: Arc<Database>,
    resolver: ClientResolver,
}

impl PersistenceRouter {
    /// Create a router over the given database.
    pub fn new(db: Arc<Database>) -> Self {
        let resolver = ClientResolver::new(db.clone());
        Self { db, resolver }
    }

    /// Route one extracted invoice.
    ///
    /// `source_text` is the recognized text the invoice was extracted
    /// from; it seeds the id for un-numbered documents.
    pub fn route(&self, invoice: &ExtractedInvoice, source_text: &str) -> RouteResult {
        let client_id = self.resolver.resolve(&invoice.client);

        let total = match invoice.total {
            Some(total) => total,
            None => {
                let message = "missing required field: total";
                return self.reject(invoice, message.to_string());
            }
        };

        let id = invoice_id(invoice.invoice_number.as_deref(), source_text);

        let date = invoice
            .date
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
        let record = InvoiceRecord {
            id: id.clone(),
            client_id,
            invoice_number: invoice
                .invoice_number
                .clone()
                .unwrap_or_else(|| format!("INV-{}", &id[..8])),
            due_date: invoice.due_date.clone().unwrap_or_else(|| date.clone()),
            date,
            bill_to: invoice
                .bill_to
                .clone()
                .unwrap_or_else(|| "Not found".to_string()),
            total,
            subtotal: invoice.subtotal,
            tax: invoice.tax,
            tax_percentage: invoice.tax_percentage,
            gstin: invoice.gstin.clone(),
            discount: invoice.discount,
            discount_percentage: invoice.discount_percentage,
            currency: invoice.currency.clone(),
            bank_name: invoice.bank_name.clone(),
            branch_name: invoice.branch_name.clone(),
            account_number: invoice.account_number.clone(),
            bank_swift_code: invoice.bank_swift_code.clone(),
            items: invoice.items.clone(),
        };

        match self.db.upsert_invoice(&record) {
            Ok(()) => RouteResult::Stored { id },
            Err(e) => {
                warn!("valid-store write failed, re-routing: {}", e);
                self.reject(invoice, format!("failed to save invoice: {}", e))
            }
        }
    }

    fn reject(&self, invoice: &ExtractedInvoice, message: String) -> RouteResult {
        if let Err(e) = self.db.insert_invalid(invoice, &message) {
            error!("invalid-store write failed: {}", e);
        }
        RouteResult::Invalid { error: message }
    }
}
