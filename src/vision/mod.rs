// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Image decoding with format detection from magic bytes
//! - Smart area detection of candidate text regions

pub mod detection;
pub mod image_utils;

pub use detection::{DetectionConfig, DetectionMethod, SmartAreaDetector, TextRegion};
pub use image_utils::{decode_image_bytes, detect_format, load_image_file, ImageError, ImageInfo};
