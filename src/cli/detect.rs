// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use crate::vision::detection::{DetectionConfig, DetectionMethod, SmartAreaDetector};
use crate::vision::image_utils::load_image_file;

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Screenshot to analyse (PNG, JPEG, WebP, GIF or BMP)
    pub image: PathBuf,

    /// Detection method (contour_based, edge_detection, text_detection, ml_based, hybrid)
    #[arg(long)]
    pub method: Option<DetectionMethod>,

    /// TOML detection config (can also be set via SMART_AREA_CONFIG env var)
    #[arg(long, env = "SMART_AREA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print only the highest-scoring region
    #[arg(long)]
    pub best: bool,

    /// Include detection statistics in the output
    #[arg(long)]
    pub stats: bool,
}

/// Run detection over one image file and build the JSON report
pub fn run_detect(args: &DetectArgs) -> Result<Value> {
    let config = match &args.config {
        Some(path) => DetectionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DetectionConfig::default(),
    };

    let (image, image_info) = load_image_file(&args.image)
        .with_context(|| format!("Failed to load image {}", args.image.display()))?;
    info!(
        "Loaded {}x{} {:?} image from {}",
        image_info.width,
        image_info.height,
        image_info.format,
        args.image.display()
    );

    let detector = SmartAreaDetector::new(config);
    let regions = detector.detect_text_regions(&image, args.method);

    let mut report = json!({
        "image": {
            "path": args.image.display().to_string(),
            "width": image_info.width,
            "height": image_info.height,
            "format": format!("{:?}", image_info.format),
        },
    });

    if args.best {
        report["best_region"] = serde_json::to_value(detector.get_best_region(&regions))?;
    } else {
        report["regions"] = serde_json::to_value(&regions)?;
    }

    if args.stats {
        report["stats"] = serde_json::to_value(detector.get_detection_stats())?;
    }

    Ok(report)
}

/// Default configuration rendered as TOML
pub fn default_config_toml() -> Result<String> {
    DetectionConfig::default()
        .to_toml_string()
        .context("Failed to render default config")
}
