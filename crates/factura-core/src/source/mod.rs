//! Page source adapter: turns an uploaded file into raster pages.

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::SourceError;

/// External PDF rasterization capability.
///
/// Returns one raster page per PDF page, in document order. The
/// pipeline works against any implementation of this trait.
pub trait PageRasterizer: Send + Sync {
    /// Rasterize a PDF at the given resolution.
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>, SourceError>;
}

/// Upload kind derived from the declared extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// A PDF document, possibly multi-page.
    Pdf,
    /// A single raster image.
    Image,
}

/// Classify an upload by its declared extension.
///
/// Only `.pdf`, `.jpg`, `.jpeg` and `.png` are accepted; anything else
/// is rejected here, before any rasterization or OCR work happens.
pub fn upload_kind(filename: &str) -> Result<UploadKind, SourceError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => Ok(UploadKind::Pdf),
        "jpg" | "jpeg" | "png" => Ok(UploadKind::Image),
        _ => Err(SourceError::UnsupportedFormat(extension)),
    }
}

/// Loads an upload's raster pages, delegating PDFs to the rasterizer.
pub struct PageSource {
    rasterizer: Box<dyn PageRasterizer>,
    render_dpi: u32,
}

impl PageSource {
    /// Create a page source over the given rasterizer.
    pub fn new(rasterizer: Box<dyn PageRasterizer>, render_dpi: u32) -> Self {
        Self {
            rasterizer,
            render_dpi,
        }
    }

    /// Load all pages of an upload, in document order.
    pub fn load_pages(
        &self,
        path: &Path,
        kind: UploadKind,
    ) -> Result<Vec<DynamicImage>, SourceError> {
        match kind {
            UploadKind::Pdf => {
                let bytes = std::fs::read(path)
                    .map_err(|e| SourceError::Rasterize(e.to_string()))?;
                let pages = self.rasterizer.rasterize(&bytes, self.render_dpi)?;
                if pages.is_empty() {
                    return Err(SourceError::NoPages);
                }
                debug!("rasterized {} PDF pages at {} dpi", pages.len(), self.render_dpi);
                Ok(pages)
            }
            UploadKind::Image => {
                let image =
                    image::open(path).map_err(|e| SourceError::Decode(e.to_string()))?;
                Ok(vec![image])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert_eq!(upload_kind("scan.pdf").unwrap(), UploadKind::Pdf);
        assert_eq!(upload_kind("scan.PDF").unwrap(), UploadKind::Pdf);
        assert_eq!(upload_kind("scan.jpg").unwrap(), UploadKind::Image);
        assert_eq!(upload_kind("scan.jpeg").unwrap(), UploadKind::Image);
        assert_eq!(upload_kind("photo.PNG").unwrap(), UploadKind::Image);
    }

    #[test]
    fn test_rejected_extensions() {
        assert!(matches!(
            upload_kind("scan.tiff"),
            Err(SourceError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            upload_kind("invoice.docx"),
            Err(SourceError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            upload_kind("no_extension"),
            Err(SourceError::UnsupportedFormat(_))
        ));
    }
}
