// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Smart area detection pipeline
//!
//! `SmartAreaDetector::detect_text_regions` runs:
//! 1. Cache lookup (a hit returns immediately, without touching statistics)
//! 2. Preprocessing (resize, grayscale, median blur)
//! 3. The selected strategy, plus fallbacks when it finds fewer than two regions
//! 4. Post-processing (size filter, overlap merge, ranking, cap)
//! 5. Cache write and expiry sweep, then statistics
//!
//! The call is synchronous and CPU-bound. Cache, statistics and config are
//! each behind their own lock, so one detector can be shared across threads;
//! concurrent calls run their pipelines in parallel.

use image::{DynamicImage, GenericImageView};
use std::sync::{Mutex, RwLock};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::cache::ResultCache;
use super::config::DetectionConfig;
use super::error::DetectionError;
use super::postprocess::{filter_regions_by_size, get_best_region, post_process_regions};
use super::preprocessing::preprocess_image;
use super::region::{DetectionMethod, TextRegion};
use super::stats::{ConfigSummary, DetectionStats, UsageStats};
use super::strategies::{deadline_passed, run_strategy_until};

/// Fallbacks run when the primary strategy finds fewer regions than this
pub const MIN_PRIMARY_REGIONS: usize = 2;

/// Fallbacks stop once the candidate pool holds this many regions
pub const ENOUGH_REGIONS: usize = 3;

/// Multi-strategy text region detector with a result cache
pub struct SmartAreaDetector {
    config: RwLock<DetectionConfig>,
    cache: ResultCache,
    usage: Mutex<UsageStats>,
}

impl std::fmt::Debug for SmartAreaDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartAreaDetector")
            .field("config", &self.config())
            .field("cache_len", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for SmartAreaDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl SmartAreaDetector {
    /// Create a detector
    ///
    /// An invalid config is accepted with a warning; out-of-range settings
    /// are sanitised where they are used.
    pub fn new(config: DetectionConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("Detection config failed validation: {}", e);
        }

        let cache = ResultCache::new(config.cache_ttl(), config.cache_max_entries);
        info!(
            "Smart area detector initialized (primary method: {})",
            config.primary_method
        );

        Self {
            config: RwLock::new(config),
            cache,
            usage: Mutex::new(UsageStats::default()),
        }
    }

    /// Copy of the active configuration
    pub fn config(&self) -> DetectionConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Detect text regions in a raw capture
    ///
    /// `method` overrides `primary_method` for this call. Regions are in the
    /// coordinate space of the preprocessed (possibly resized) image. Never
    /// fails: any error is logged and yields an empty list.
    pub fn detect_text_regions(
        &self,
        image: &DynamicImage,
        method: Option<DetectionMethod>,
    ) -> Vec<TextRegion> {
        let started = Instant::now();
        let config = self.config();
        let method = method.unwrap_or(config.primary_method);

        match self.run_pipeline(image, method, &config, started) {
            Ok(regions) => regions,
            Err(e) => {
                error!("Text region detection failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Same as `detect_text_regions` with the method given by its string tag
    ///
    /// An unrecognised tag logs a warning and returns no regions.
    pub fn detect_text_regions_by_name(&self, image: &DynamicImage, method: &str) -> Vec<TextRegion> {
        match method.parse::<DetectionMethod>() {
            Ok(method) => self.detect_text_regions(image, Some(method)),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    fn run_pipeline(
        &self,
        image: &DynamicImage,
        method: DetectionMethod,
        config: &DetectionConfig,
        started: Instant,
    ) -> Result<Vec<TextRegion>, DetectionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectionError::EmptyImage { width, height });
        }

        let cache_key = config
            .enable_caching
            .then(|| ResultCache::cache_key(image, method, &config.fingerprint()));

        if let Some(key) = &cache_key {
            if let Some(cached) = self.cache.get(key) {
                debug!("Using cached detection results ({} regions)", cached.len());
                return Ok(cached);
            }
        }

        let deadline = config
            .processing_budget()
            .and_then(|budget| started.checked_add(budget));

        let processed = preprocess_image(image, config);
        let mut regions = run_strategy_until(method, &processed, config, deadline);

        if regions.len() < MIN_PRIMARY_REGIONS && method != DetectionMethod::Hybrid {
            for &fallback in config.fallback_methods.iter().filter(|&&m| m != method) {
                if deadline_passed(deadline) {
                    warn!(
                        "Processing budget of {:.2}s exhausted, skipping fallback {}",
                        config.max_processing_time, fallback
                    );
                    break;
                }
                debug!("Trying fallback method {}", fallback);
                regions.extend(run_strategy_until(fallback, &processed, config, deadline));
                if regions.len() >= ENOUGH_REGIONS {
                    break;
                }
            }
        }

        let regions = post_process_regions(regions, config);

        if let Some(key) = cache_key {
            self.cache.insert(key, &regions);
            let purged = self.cache.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired cache entries", purged);
            }
        }

        let elapsed = started.elapsed();
        if let Ok(mut usage) = self.usage.lock() {
            usage.record(method, elapsed);
        }

        debug!(
            "Detected {} text regions in {:.2}s using {}",
            regions.len(),
            elapsed.as_secs_f64(),
            method
        );
        Ok(regions)
    }

    /// Highest-scoring region, `None` for an empty list
    pub fn get_best_region<'a>(&self, regions: &'a [TextRegion]) -> Option<&'a TextRegion> {
        get_best_region(regions)
    }

    /// Regions whose area lies in `min_area..=max_area`
    pub fn filter_regions_by_size(
        &self,
        regions: &[TextRegion],
        min_area: u64,
        max_area: Option<u64>,
    ) -> Vec<TextRegion> {
        filter_regions_by_size(regions, min_area, max_area)
    }

    /// Timing, per-method usage and cache size
    pub fn get_detection_stats(&self) -> DetectionStats {
        let config = self.config();
        let usage = match self.usage.lock() {
            Ok(usage) => usage.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let cache = self.cache.stats();

        DetectionStats {
            total_detections: usage.count(),
            average_time_seconds: usage.average_secs(),
            min_time_seconds: usage.min_secs(),
            max_time_seconds: usage.max_secs(),
            std_dev_time_seconds: usage.std_dev_secs(),
            method_usage: usage.method_counts().clone(),
            cache_size: cache.total,
            cache_expired: cache.expired,
            cache_capacity: cache.max,
            config: ConfigSummary {
                primary_method: config.primary_method,
                min_region_size: config.min_region_size,
                max_regions: config.max_regions,
            },
        }
    }

    /// Number of cached results, expired ones included
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Clear detection cache
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Detection cache cleared");
    }

    /// Replace the configuration and drop every cached result
    pub fn update_config(&self, config: DetectionConfig) {
        if let Err(e) = config.validate() {
            warn!("Detection config failed validation: {}", e);
        }

        self.cache
            .reconfigure(config.cache_ttl(), config.cache_max_entries);
        match self.config.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
        self.clear_cache();
        info!("Detection configuration updated");
    }
}
