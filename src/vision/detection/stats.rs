// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection usage statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::region::DetectionMethod;

/// Running timing summary and per-method call counts
///
/// Durations are folded into count, sum, sum of squares, min and max, so
/// memory stays constant however many detections run.
#[derive(Debug, Clone)]
pub struct UsageStats {
    count: u64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
    method_counts: BTreeMap<DetectionMethod, u64>,
}

impl Default for UsageStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: 0.0,
            method_counts: DetectionMethod::ALL.iter().map(|m| (*m, 0)).collect(),
        }
    }
}

impl UsageStats {
    /// Record one completed (non-cached) detection
    pub fn record(&mut self, method: DetectionMethod, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.count += 1;
        self.sum += secs;
        self.sum_sq += secs * secs;
        self.min = self.min.min(secs);
        self.max = self.max.max(secs);
        *self.method_counts.entry(method).or_insert(0) += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn average_secs(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Population standard deviation of recorded durations
    pub fn std_dev_secs(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.average_secs();
        (self.sum_sq / self.count as f64 - mean * mean).max(0.0).sqrt()
    }

    pub fn min_secs(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    pub fn max_secs(&self) -> f64 {
        self.max
    }

    pub fn method_counts(&self) -> &BTreeMap<DetectionMethod, u64> {
        &self.method_counts
    }
}

/// Configuration values echoed in `DetectionStats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub primary_method: DetectionMethod,
    pub min_region_size: u64,
    pub max_regions: usize,
}

/// Snapshot returned by `SmartAreaDetector::get_detection_stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub total_detections: u64,
    pub average_time_seconds: f64,
    pub min_time_seconds: f64,
    pub max_time_seconds: f64,
    pub std_dev_time_seconds: f64,
    pub method_usage: BTreeMap<DetectionMethod, u64>,
    pub cache_size: usize,
    /// Entries past their TTL that the next detection will purge
    pub cache_expired: usize,
    pub cache_capacity: usize,
    pub config: ConfigSummary,
}
