//! Invoice field extraction from recognized text.

pub mod extractor;
pub mod rules;

pub use extractor::{normalize_lines, normalize_text, InvoiceExtractor};
