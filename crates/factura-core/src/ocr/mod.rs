//! Text recognition orchestration.
//!
//! The OCR capability itself is an external collaborator behind
//! [`TextRecognizer`]; this module conditions each page and stitches
//! per-page output back together in page order.

pub mod conditioning;

pub use conditioning::ImageConditioner;

use image::{DynamicImage, GrayImage};
use tracing::debug;

use crate::error::OcrError;

/// Recognition mode passed to the external OCR capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMode {
    /// Tuned for structured documents: treat the page as a uniform
    /// block and preserve inter-word spacing so column layouts remain
    /// parseable. This is the mode the pipeline uses for invoices.
    StructuredDocument,

    /// Let the recognizer segment the page on its own.
    Automatic,
}

/// External text recognition capability.
///
/// Implementations must honor the mode contract but are otherwise free;
/// the pipeline works against any implementation of this trait.
pub trait TextRecognizer: Send + Sync {
    /// Recognize text on a single conditioned page.
    fn recognize(&self, page: &GrayImage, mode: RecognitionMode)
        -> Result<String, OcrError>;
}

/// Conditions pages and runs them through the recognizer.
pub struct TextExtractor {
    conditioner: ImageConditioner,
    recognizer: Box<dyn TextRecognizer>,
}

impl TextExtractor {
    /// Create an extractor over the given recognizer.
    pub fn new(conditioner: ImageConditioner, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            conditioner,
            recognizer,
        }
    }

    /// Recognize all pages of a document and join the per-page text
    /// with newlines, preserving page order.
    ///
    /// Recognition failure on any page aborts the whole document; a
    /// partially recognized invoice must never reach field extraction.
    pub fn extract_text(&self, pages: &[DynamicImage]) -> Result<String, OcrError> {
        let mut parts = Vec::with_capacity(pages.len());

        for (index, page) in pages.iter().enumerate() {
            let conditioned = self.conditioner.condition(page);
            let text = self
                .recognizer
                .recognize(&conditioned, RecognitionMode::StructuredDocument)?;

            debug!("page {}: recognized {} characters", index + 1, text.len());
            parts.push(text);
        }

        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    struct FixedRecognizer {
        pages: std::sync::Mutex<Vec<Result<String, String>>>,
    }

    impl TextRecognizer for FixedRecognizer {
        fn recognize(
            &self,
            _page: &GrayImage,
            _mode: RecognitionMode,
        ) -> Result<String, OcrError> {
            let mut pages = self.pages.lock().unwrap();
            match pages.remove(0) {
                Ok(text) => Ok(text),
                Err(e) => Err(OcrError::Recognition(e)),
            }
        }
    }

    fn blank_page() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([255u8])))
    }

    #[test]
    fn test_pages_joined_in_order() {
        let recognizer = FixedRecognizer {
            pages: std::sync::Mutex::new(vec![
                Ok("page one".to_string()),
                Ok("page two".to_string()),
            ]),
        };
        let extractor = TextExtractor::new(ImageConditioner::new(), Box::new(recognizer));

        let text = extractor
            .extract_text(&[blank_page(), blank_page()])
            .unwrap();
        assert_eq!(text, "page one\npage two");
    }

    #[test]
    fn test_page_failure_aborts_document() {
        let recognizer = FixedRecognizer {
            pages: std::sync::Mutex::new(vec![
                Ok("page one".to_string()),
                Err("engine crashed".to_string()),
            ]),
        };
        let extractor = TextExtractor::new(ImageConditioner::new(), Box::new(recognizer));

        let result = extractor.extract_text(&[blank_page(), blank_page()]);
        assert!(result.is_err());
    }
}
