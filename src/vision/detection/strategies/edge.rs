// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Edge-based detection

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;
use tracing::debug;

use super::{ensure_not_empty, external_bounding_boxes, foreground_density};
use super::DetectionStrategy;
use crate::vision::detection::config::DetectionConfig;
use crate::vision::detection::error::DetectionError;
use crate::vision::detection::region::{DetectionMethod, TextRegion};

/// Canny edges dilated with a 3x3 square so neighbouring strokes join up
///
/// Only `min_region_size` filters candidates here; there is no aspect
/// ratio check. Confidence is three times the edge density, capped at 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeStrategy;

impl DetectionStrategy for EdgeStrategy {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::EdgeDetection
    }

    fn detect(
        &self,
        image: &GrayImage,
        config: &DetectionConfig,
    ) -> Result<Vec<TextRegion>, DetectionError> {
        ensure_not_empty(image)?;

        let low = config.canny_low_threshold;
        let high = config.canny_high_threshold;
        if !low.is_finite() || !high.is_finite() || low < 0.0 || low > high {
            return Err(DetectionError::Primitive {
                primitive: "canny",
                reason: format!("invalid thresholds low={} high={}", low, high),
            });
        }

        let mut edges = canny(image, low, high);
        for _ in 0..config.edge_dilation_iterations {
            edges = dilate(&edges, Norm::LInf, 1);
        }

        let regions: Vec<TextRegion> = external_bounding_boxes(&edges)
            .into_iter()
            .filter(|bbox| bbox.area() >= config.min_region_size)
            .map(|bbox| {
                let density = foreground_density(&edges, &bbox);
                TextRegion::new(
                    bbox.x,
                    bbox.y,
                    bbox.width,
                    bbox.height,
                    (density * 3.0).min(1.0),
                    density,
                    DetectionMethod::EdgeDetection,
                )
            })
            .collect();

        debug!("Edge detection kept {} regions", regions.len());
        Ok(regions)
    }
}
