//! Configuration structures for the processing pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the factura pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacturaConfig {
    /// Image conditioning configuration.
    pub conditioning: ConditioningConfig,

    /// Page source configuration.
    pub source: SourceConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Persistence configuration.
    pub store: StoreConfig,
}

/// Image conditioning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditioningConfig {
    /// Gaussian blur sigma applied before thresholding.
    pub blur_sigma: f32,

    /// Adaptive threshold block size in pixels (odd).
    pub threshold_block_size: u32,

    /// Offset subtracted from the local mean when thresholding.
    pub threshold_offset: i32,

    /// Multiplicative contrast factor applied around the image mean.
    pub contrast_factor: f32,

    /// Canny edge detection thresholds.
    pub canny_low: f32,
    pub canny_high: f32,

    /// Minimum Hough votes for a line to count towards deskew.
    pub hough_vote_threshold: u32,

    /// Skew magnitude below which rotation is skipped, in degrees.
    pub skew_threshold_degrees: f32,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            threshold_block_size: 11,
            threshold_offset: 2,
            contrast_factor: 2.0,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_vote_threshold: 120,
            skew_threshold_degrees: 0.5,
        }
    }
}

/// Page source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// DPI for rasterizing PDF pages.
    pub render_dpi: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { render_dpi: 300 }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency assumed when the text names none.
    pub default_currency: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_currency: "EUR".to_string(),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("invoices.db"),
        }
    }
}

impl FacturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FacturaConfig::default();
        assert_eq!(config.source.render_dpi, 300);
        assert_eq!(config.extraction.default_currency, "EUR");
        assert_eq!(config.conditioning.skew_threshold_degrees, 0.5);
    }

    #[test]
    fn test_partial_file_round_trip() {
        let json = r#"{"source": {"render_dpi": 150}}"#;
        let config: FacturaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.source.render_dpi, 150);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.conditioning.threshold_block_size, 11);
    }
}
