// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Contour-based detection

use image::GrayImage;
use tracing::debug;

use super::{binarize_otsu, ensure_not_empty, external_bounding_boxes, foreground_density};
use super::DetectionStrategy;
use crate::vision::detection::config::DetectionConfig;
use crate::vision::detection::error::DetectionError;
use crate::vision::detection::region::{DetectionMethod, TextRegion};

/// Otsu-binarised external contours filtered by area and aspect ratio
///
/// Confidence is twice the foreground density of the box, capped at 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourStrategy;

impl DetectionStrategy for ContourStrategy {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ContourBased
    }

    fn detect(
        &self,
        image: &GrayImage,
        config: &DetectionConfig,
    ) -> Result<Vec<TextRegion>, DetectionError> {
        ensure_not_empty(image)?;

        let binary = binarize_otsu(image);
        let regions: Vec<TextRegion> = external_bounding_boxes(&binary)
            .into_iter()
            .filter(|bbox| {
                let area = bbox.area();
                let aspect = bbox.aspect_ratio();
                (config.contour_min_area..=config.contour_max_area).contains(&area)
                    && aspect >= config.contour_aspect_ratio_min
                    && aspect <= config.contour_aspect_ratio_max
            })
            .map(|bbox| {
                let density = foreground_density(&binary, &bbox);
                TextRegion::new(
                    bbox.x,
                    bbox.y,
                    bbox.width,
                    bbox.height,
                    (density * 2.0).min(1.0),
                    density,
                    DetectionMethod::ContourBased,
                )
            })
            .collect();

        debug!("Contour detection kept {} regions", regions.len());
        Ok(regions)
    }
}
