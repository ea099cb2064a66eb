//! Default implementations of the external collaborator traits.
//!
//! Both are thin subprocess wrappers: `pdftoppm` for PDF rasterization
//! and `tesseract` for text recognition. The core never spawns
//! processes; swapping these out does not touch the pipeline.

use std::path::PathBuf;
use std::process::Command;

use image::{DynamicImage, GrayImage};
use tracing::debug;

use factura_core::error::{OcrError, SourceError};
use factura_core::{PageRasterizer, RecognitionMode, TextRecognizer};

/// Rasterizes PDFs by shelling out to `pdftoppm`.
pub struct PdftoppmRasterizer;

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>, SourceError> {
        let dir = tempfile::tempdir().map_err(|e| SourceError::Rasterize(e.to_string()))?;
        let pdf_path = dir.path().join("input.pdf");
        std::fs::write(&pdf_path, pdf).map_err(|e| SourceError::Rasterize(e.to_string()))?;

        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(&pdf_path)
            .arg(dir.path().join("page"))
            .output()
            .map_err(|e| SourceError::Rasterize(format!("failed to run pdftoppm: {}", e)))?;

        if !output.status.success() {
            return Err(SourceError::Rasterize(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        // pdftoppm writes page-1.png, page-2.png, ...; sort numerically
        // so page 10 does not land before page 2.
        let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir.path())
            .map_err(|e| SourceError::Rasterize(e.to_string()))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let stem = path.file_stem()?.to_str()?;
                let number: u32 = stem.strip_prefix("page-")?.parse().ok()?;
                Some((number, path))
            })
            .collect();
        pages.sort_by_key(|(number, _)| *number);

        if pages.is_empty() {
            return Err(SourceError::NoPages);
        }
        debug!("pdftoppm produced {} pages", pages.len());

        pages
            .into_iter()
            .map(|(_, path)| {
                image::open(&path).map_err(|e| SourceError::Rasterize(e.to_string()))
            })
            .collect()
    }
}

/// Recognizes text by shelling out to `tesseract`.
pub struct TesseractRecognizer;

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, page: &GrayImage, mode: RecognitionMode) -> Result<String, OcrError> {
        let dir = tempfile::tempdir().map_err(|e| OcrError::Unavailable(e.to_string()))?;
        let page_path = dir.path().join("page.png");
        page.save(&page_path)
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        let mut command = Command::new("tesseract");
        command.arg(&page_path).arg("stdout");
        match mode {
            // Uniform text block with inter-word spacing preserved, so
            // column layouts stay parseable downstream.
            RecognitionMode::StructuredDocument => {
                command.args(["--psm", "6", "-c", "preserve_interword_spaces=1"]);
            }
            RecognitionMode::Automatic => {
                command.args(["--psm", "3"]);
            }
        }

        let output = command
            .output()
            .map_err(|e| OcrError::Unavailable(format!("failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            return Err(OcrError::Recognition(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
