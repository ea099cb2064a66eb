//! Batch coordinator driving the full processing chain per upload.

use std::io::Write;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Result;
use crate::invoice::InvoiceExtractor;
use crate::models::config::FacturaConfig;
use crate::models::invoice::FileOutcome;
use crate::ocr::{ImageConditioner, TextExtractor, TextRecognizer};
use crate::source::{upload_kind, PageRasterizer, PageSource};
use crate::store::{Database, PersistenceRouter, RouteResult};

/// End-to-end invoice processing pipeline.
///
/// Drives source loading, conditioning, recognition, extraction and
/// routing for each uploaded file. Failures are contained at file
/// granularity: one bad document never aborts the rest of a batch.
pub struct InvoicePipeline {
    source: PageSource,
    text: TextExtractor,
    extractor: InvoiceExtractor,
    router: PersistenceRouter,
}

impl InvoicePipeline {
    /// Assemble a pipeline from configuration, the two external
    /// collaborators, and an open database.
    pub fn new(
        config: &FacturaConfig,
        rasterizer: Box<dyn PageRasterizer>,
        recognizer: Box<dyn TextRecognizer>,
        db: Arc<Database>,
    ) -> Self {
        Self {
            source: PageSource::new(rasterizer, config.source.render_dpi),
            text: TextExtractor::new(
                ImageConditioner::from_config(&config.conditioning),
                recognizer,
            ),
            extractor: InvoiceExtractor::from_config(&config.extraction),
            router: PersistenceRouter::new(db),
        }
    }

    /// Process a batch of uploads sequentially, one outcome per file.
    pub fn process_batch(&self, uploads: &[(String, Vec<u8>)]) -> Vec<FileOutcome> {
        uploads
            .iter()
            .map(|(filename, bytes)| self.process_upload(filename, bytes))
            .collect()
    }

    /// Process a single upload. Never panics outward and never returns
    /// an error: every failure becomes an error outcome for this file.
    pub fn process_upload(&self, filename: &str, bytes: &[u8]) -> FileOutcome {
        info!("processing {}", filename);

        match self.process_inner(filename, bytes) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("failed to process {}: {}", filename, e);
                FileOutcome::error(filename, e.to_string())
            }
        }
    }

    fn process_inner(&self, filename: &str, bytes: &[u8]) -> Result<FileOutcome> {
        // Reject bad extensions before any OCR work.
        let kind = upload_kind(filename)?;

        // Scoped copy of the upload; the file is removed on every exit
        // path, including panics, when the handle drops.
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_lowercase();
        let mut upload = tempfile::Builder::new()
            .prefix("factura-upload-")
            .suffix(&format!(".{}", extension))
            .tempfile()?;
        upload.write_all(bytes)?;
        upload.flush()?;

        let pages = self.source.load_pages(upload.path(), kind)?;
        let text = self.text.extract_text(&pages)?;

        let invoice = self.extractor.extract(&text);

        match self.router.route(&invoice, &text) {
            RouteResult::Stored { .. } => Ok(FileOutcome::success(filename, invoice)),
            RouteResult::Invalid { error } => Ok(FileOutcome::invalid(filename, invoice, error)),
        }
    }
}
