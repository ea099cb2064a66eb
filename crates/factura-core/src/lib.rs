//! Core library for invoice document processing.
//!
//! This crate provides:
//! - image conditioning for noisy or skewed scans (binarize, denoise,
//!   deskew)
//! - page sourcing for image and PDF uploads
//! - field extraction from recognized text via ordered pattern cascades
//! - client identity resolution with email/phone deduplication
//! - fail-safe routing into valid and invalid invoice stores
//!
//! OCR and PDF rasterization are external collaborators consumed
//! through the [`TextRecognizer`] and [`PageRasterizer`] traits.

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod source;
pub mod store;

pub use error::{FacturaError, OcrError, Result, SourceError, StoreError};
pub use invoice::InvoiceExtractor;
pub use models::config::FacturaConfig;
pub use models::invoice::{
    ClientContact, ClientIdentity, ExtractedInvoice, FileOutcome, InvoiceRecord, LineItem,
    OutcomeStatus,
};
pub use ocr::{ImageConditioner, RecognitionMode, TextExtractor, TextRecognizer};
pub use pipeline::InvoicePipeline;
pub use source::{upload_kind, PageRasterizer, PageSource, UploadKind};
pub use store::{invoice_id, ClientResolver, Database, PersistenceRouter, RouteResult};
