// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Smart area detection: locating candidate text regions in screenshots
//!
//! Components:
//! - `region` - Region and method types
//! - `config` - Tunable parameters, loadable from TOML
//! - `preprocessing` - Resize, grayscale and median blur
//! - `strategies` - Contour, edge, blob, ML (unavailable) and hybrid detectors
//! - `postprocess` - Merging, ranking and scoring
//! - `cache` - TTL cache of finished results
//! - `stats` - Timing and usage statistics
//! - `detector` - The `SmartAreaDetector` pipeline

pub mod cache;
pub mod config;
pub mod detector;
pub mod error;
pub mod postprocess;
pub mod preprocessing;
pub mod region;
pub mod stats;
pub mod strategies;

pub use cache::{CacheStats, ResultCache};
pub use config::DetectionConfig;
pub use detector::SmartAreaDetector;
pub use error::{ConfigError, DetectionError};
pub use postprocess::{
    are_regions_similar, filter_regions_by_size, get_best_region, merge_overlapping_regions,
    merge_similar_regions, post_process_regions, region_score,
};
pub use preprocessing::preprocess_image;
pub use region::{DetectionMethod, TextRegion};
pub use stats::{ConfigSummary, DetectionStats};
pub use strategies::{run_strategy, DetectionStrategy, PixelBox};
