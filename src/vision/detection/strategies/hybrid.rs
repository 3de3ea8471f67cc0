// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Hybrid detection: contour, edge and blob results fused into one list

use image::GrayImage;
use std::time::Instant;
use tracing::{debug, warn};

use super::{deadline_passed, run_strategy_until, DetectionStrategy};
use crate::vision::detection::config::DetectionConfig;
use crate::vision::detection::error::DetectionError;
use crate::vision::detection::postprocess::merge_similar_regions;
use crate::vision::detection::region::{DetectionMethod, TextRegion};

/// Strategies fused by the hybrid detector, in invocation order
pub const FUSED_METHODS: [DetectionMethod; 3] = [
    DetectionMethod::ContourBased,
    DetectionMethod::EdgeDetection,
    DetectionMethod::TextDetection,
];

/// Overlap ratio at which two candidates are treated as the same text
pub const SIMILARITY_THRESHOLD: f32 = 0.2;

/// Runs every strategy in `FUSED_METHODS` and groups similar boxes
///
/// A failing sub-strategy contributes nothing; the others still run. With a
/// deadline, sub-strategies after the first are skipped once it passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridStrategy {
    deadline: Option<Instant>,
}

impl HybridStrategy {
    pub fn with_deadline(deadline: Option<Instant>) -> Self {
        Self { deadline }
    }
}

impl DetectionStrategy for HybridStrategy {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Hybrid
    }

    fn detect(
        &self,
        image: &GrayImage,
        config: &DetectionConfig,
    ) -> Result<Vec<TextRegion>, DetectionError> {
        let mut candidates = Vec::new();

        for (index, method) in FUSED_METHODS.into_iter().enumerate() {
            if index > 0 && deadline_passed(self.deadline) {
                warn!(
                    "Processing budget exhausted, skipping {} and later hybrid stages",
                    method
                );
                break;
            }
            candidates.extend(run_strategy_until(method, image, config, self.deadline));
        }

        let fused = merge_similar_regions(&candidates, SIMILARITY_THRESHOLD);
        debug!(
            "Hybrid detection fused {} candidates into {} regions",
            candidates.len(),
            fused.len()
        );
        Ok(fused)
    }
}
