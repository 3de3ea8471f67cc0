// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Smart area detection CLI
#[derive(Parser, Debug)]
#[command(name = "smart-area")]
#[command(version)]
#[command(about = "Locate candidate text regions in screenshots", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect text regions in an image and print them as JSON
    Detect(detect::DetectArgs),

    /// Print the default detection config as TOML
    DefaultConfig,
}

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Detect(args) => {
            let report = detect::run_detect(&args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::DefaultConfig => print!("{}", detect::default_config_toml()?),
    }
    Ok(())
}
