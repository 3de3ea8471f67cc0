// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tunable thresholds for smart area detection

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

use super::error::ConfigError;
use super::region::DetectionMethod;

/// Largest accepted `resize_factor`
pub const MAX_RESIZE_FACTOR: f32 = 8.0;

/// Largest accepted `blur_kernel_size`
pub const MAX_BLUR_KERNEL_SIZE: u32 = 101;

/// Configuration for `SmartAreaDetector`
///
/// Every field has a default, so a TOML file only needs the values it
/// overrides. The detector treats the config as read-only; replace it with
/// `SmartAreaDetector::update_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    // Method selection
    pub primary_method: DetectionMethod,
    pub fallback_methods: Vec<DetectionMethod>,

    // Image preprocessing
    pub resize_factor: f32,
    pub blur_kernel_size: u32,
    pub apply_noise_reduction: bool,

    // Contour detection
    pub contour_min_area: u64,
    pub contour_max_area: u64,
    pub contour_aspect_ratio_min: f32,
    pub contour_aspect_ratio_max: f32,

    // Edge detection
    pub canny_low_threshold: f32,
    pub canny_high_threshold: f32,
    pub edge_dilation_iterations: u32,

    /// Reserved for a learned text detector
    pub text_confidence_threshold: f32,
    /// Reserved for a learned text detector
    pub text_nms_threshold: f32,

    // Region filtering
    pub min_region_size: u64,
    pub max_regions: usize,
    pub merge_overlapping: bool,
    pub overlap_threshold: f32,

    /// Budget in seconds, checked between detection stages
    ///
    /// Fallbacks and later hybrid stages are skipped once it runs out, so on
    /// large captures or slow machines the result depends on timing. Set a
    /// large value for reproducible output.
    pub max_processing_time: f64,

    // Caching
    pub enable_caching: bool,
    /// Entry lifetime in seconds
    pub cache_max_age: f64,
    pub cache_max_entries: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            primary_method: DetectionMethod::Hybrid,
            fallback_methods: vec![DetectionMethod::ContourBased, DetectionMethod::EdgeDetection],
            resize_factor: 1.0,
            blur_kernel_size: 3,
            apply_noise_reduction: true,
            contour_min_area: 100,
            contour_max_area: 50_000,
            contour_aspect_ratio_min: 0.1,
            contour_aspect_ratio_max: 10.0,
            canny_low_threshold: 50.0,
            canny_high_threshold: 150.0,
            edge_dilation_iterations: 2,
            text_confidence_threshold: 0.5,
            text_nms_threshold: 0.4,
            min_region_size: 400,
            max_regions: 10,
            merge_overlapping: true,
            overlap_threshold: 0.3,
            max_processing_time: 2.0,
            enable_caching: true,
            cache_max_age: 30.0,
            cache_max_entries: 64,
        }
    }
}

impl DetectionConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DetectionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Check field ranges and cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.resize_factor.is_finite()
            || self.resize_factor <= 0.0
            || self.resize_factor > MAX_RESIZE_FACTOR
        {
            return Err(ConfigError::invalid(
                "resize_factor",
                format!(
                    "must be within (0, {}], got {}",
                    MAX_RESIZE_FACTOR, self.resize_factor
                ),
            ));
        }
        if self.blur_kernel_size > MAX_BLUR_KERNEL_SIZE {
            return Err(ConfigError::invalid(
                "blur_kernel_size",
                format!(
                    "must be at most {}, got {}",
                    MAX_BLUR_KERNEL_SIZE, self.blur_kernel_size
                ),
            ));
        }
        if self.blur_kernel_size % 2 == 0 {
            return Err(ConfigError::invalid(
                "blur_kernel_size",
                format!("must be odd, got {}", self.blur_kernel_size),
            ));
        }
        if self.contour_min_area > self.contour_max_area {
            return Err(ConfigError::invalid(
                "contour_min_area",
                format!(
                    "{} exceeds contour_max_area {}",
                    self.contour_min_area, self.contour_max_area
                ),
            ));
        }
        if self.contour_aspect_ratio_min > self.contour_aspect_ratio_max {
            return Err(ConfigError::invalid(
                "contour_aspect_ratio_min",
                format!(
                    "{} exceeds contour_aspect_ratio_max {}",
                    self.contour_aspect_ratio_min, self.contour_aspect_ratio_max
                ),
            ));
        }
        if self.canny_low_threshold > self.canny_high_threshold {
            return Err(ConfigError::invalid(
                "canny_low_threshold",
                format!(
                    "{} exceeds canny_high_threshold {}",
                    self.canny_low_threshold, self.canny_high_threshold
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(ConfigError::invalid(
                "overlap_threshold",
                format!("must be within [0, 1], got {}", self.overlap_threshold),
            ));
        }
        if self.max_regions == 0 {
            return Err(ConfigError::invalid("max_regions", "must be at least 1"));
        }
        if !self.max_processing_time.is_finite() || self.max_processing_time < 0.0 {
            return Err(ConfigError::invalid(
                "max_processing_time",
                format!("must be a non-negative number, got {}", self.max_processing_time),
            ));
        }
        if !self.cache_max_age.is_finite() || self.cache_max_age < 0.0 {
            return Err(ConfigError::invalid(
                "cache_max_age",
                format!("must be a non-negative number, got {}", self.cache_max_age),
            ));
        }
        Ok(())
    }

    /// Processing budget, `None` when the value cannot be represented
    pub fn processing_budget(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.max_processing_time).ok()
    }

    /// Cache entry lifetime; unusable values fall back to 30 seconds
    pub fn cache_ttl(&self) -> Duration {
        Duration::try_from_secs_f64(self.cache_max_age).unwrap_or(Duration::from_secs(30))
    }

    /// Short digest of every field, mixed into cache keys
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match serde_json::to_vec(self) {
            Ok(bytes) => hasher.update(&bytes),
            // Non-finite floats cannot be serialized; Debug output still distinguishes configs
            Err(_) => hasher.update(format!("{:?}", self).as_bytes()),
        }
        hex::encode(hasher.finalize())[..16].to_string()
    }

    /// Pretty TOML rendering of this config
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
