//! Error types for the factura-core library.

use thiserror::Error;

/// Main error type for the factura library.
#[derive(Error, Debug)]
pub enum FacturaError {
    /// Page source error (bad upload, rasterization failure).
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to turning an upload into raster pages.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The upload's extension is not on the allow-list.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The external rasterizer failed on a PDF.
    #[error("failed to rasterize PDF: {0}")]
    Rasterize(String),

    /// An image upload could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The upload produced no pages.
    #[error("document has no pages")]
    NoPages,
}

/// Errors related to text recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The external recognizer failed on a page.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The recognizer itself could not be invoked.
    #[error("recognizer unavailable: {0}")]
    Unavailable(String),
}

/// Errors related to the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to serialize a stored field (line items).
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for the factura library.
pub type Result<T> = std::result::Result<T, FacturaError>;
