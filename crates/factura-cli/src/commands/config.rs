//! Configuration management command.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use factura_core::FacturaConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Where to write the file
        #[arg(default_value = "factura.json")]
        path: PathBuf,
    },

    /// Print the effective configuration
    Show,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Init { path } => {
            if path.exists() {
                anyhow::bail!("refusing to overwrite existing file: {}", path.display());
            }
            FacturaConfig::default().save(&path)?;
            println!(
                "{} Wrote default configuration to {}",
                style("✓").green(),
                path.display()
            );
        }
        ConfigAction::Show => {
            let config = super::load_config(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
