//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::sync::Arc;

use factura_core::{Database, FacturaConfig, InvoicePipeline};

use crate::collaborators::{PdftoppmRasterizer, TesseractRecognizer};

/// Load configuration from the given path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FacturaConfig> {
    match config_path {
        Some(path) => Ok(FacturaConfig::from_file(std::path::Path::new(path))?),
        None => Ok(FacturaConfig::default()),
    }
}

/// Assemble the pipeline with the default subprocess collaborators.
pub fn build_pipeline(config: &FacturaConfig) -> anyhow::Result<InvoicePipeline> {
    let db = Arc::new(Database::open(&config.store.db_path)?);
    Ok(InvoicePipeline::new(
        config,
        Box::new(PdftoppmRasterizer),
        Box::new(TesseractRecognizer),
        db,
    ))
}
