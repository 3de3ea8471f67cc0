// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Blob detection with maximally stable extremal regions
//!
//! The image is thresholded at every `STABLE_REGION_DELTA` grey levels and
//! connected components are labelled at each level. A component is stable
//! when the component containing it one level looser is at most
//! `STABLE_REGION_MAX_VARIATION` larger. Both polarities are searched so
//! dark text on a light background and light text on a dark one are found.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashSet;
use tracing::debug;

use super::{ensure_not_empty, threshold_above, DetectionStrategy, PixelBox};
use crate::vision::detection::config::DetectionConfig;
use crate::vision::detection::error::DetectionError;
use crate::vision::detection::region::{DetectionMethod, TextRegion};

/// Grey-level step between thresholds
pub const STABLE_REGION_DELTA: u8 = 5;
/// Smallest component, in pixels, considered a region
pub const STABLE_REGION_MIN_AREA: u64 = 60;
/// Largest component, in pixels, considered a region
pub const STABLE_REGION_MAX_AREA: u64 = 14_400;
/// Maximum relative growth to the enclosing component one level looser
pub const STABLE_REGION_MAX_VARIATION: f32 = 0.25;

/// Text density reported for blobs, which carry no density measurement
const UNMEASURED_DENSITY: f32 = 0.5;

/// A stable component: its bounding box and how many pixels it holds
#[derive(Debug, Clone, PartialEq)]
pub struct StableRegion {
    pub bounds: PixelBox,
    pub pixel_count: u64,
}

/// MSER-style blob detector
///
/// Confidence is the region's pixel count over 1000, capped at 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobStrategy;

impl DetectionStrategy for BlobStrategy {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::TextDetection
    }

    fn detect(
        &self,
        image: &GrayImage,
        config: &DetectionConfig,
    ) -> Result<Vec<TextRegion>, DetectionError> {
        ensure_not_empty(image)?;

        let regions: Vec<TextRegion> = detect_stable_regions(image)
            .into_iter()
            .filter(|r| r.bounds.area() >= config.min_region_size)
            .map(|r| {
                TextRegion::new(
                    r.bounds.x,
                    r.bounds.y,
                    r.bounds.width,
                    r.bounds.height,
                    (r.pixel_count as f32 / 1000.0).min(1.0),
                    UNMEASURED_DENSITY,
                    DetectionMethod::TextDetection,
                )
            })
            .collect();

        debug!("Blob detection kept {} regions", regions.len());
        Ok(regions)
    }
}

/// Find stable extremal regions of both polarities
///
/// Bright regions are reported first, then dark ones. A region seen at
/// several thresholds with the same box and pixel count is reported once.
pub fn detect_stable_regions(image: &GrayImage) -> Vec<StableRegion> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    collect_stable_regions(image, &mut found, &mut seen);

    let mut inverted = image.clone();
    image::imageops::invert(&mut inverted);
    collect_stable_regions(&inverted, &mut found, &mut seen);

    found
}

#[derive(Debug, Clone, Copy)]
struct ComponentStats {
    area: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    seed: (u32, u32),
}

impl ComponentStats {
    fn new(x: u32, y: u32) -> Self {
        Self {
            area: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            seed: (x, y),
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn bounds(&self) -> PixelBox {
        PixelBox {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x + 1,
            height: self.max_y - self.min_y + 1,
        }
    }
}

/// Labelled components at one threshold, indexed by label (0 is background)
struct Level {
    labels: image::ImageBuffer<Luma<u32>, Vec<u32>>,
    components: Vec<Option<ComponentStats>>,
}

impl Level {
    fn at(image: &GrayImage, threshold: u8) -> Self {
        let mask = threshold_above(image, threshold);
        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

        let mut components: Vec<Option<ComponentStats>> = Vec::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0] as usize;
            if label == 0 {
                continue;
            }
            if components.len() <= label {
                components.resize(label + 1, None);
            }
            components[label]
                .get_or_insert_with(|| ComponentStats::new(x, y))
                .add(x, y);
        }

        Self { labels, components }
    }

    fn is_empty(&self) -> bool {
        self.components.iter().all(Option::is_none)
    }

    fn area_at(&self, x: u32, y: u32) -> Option<u64> {
        let label = self.labels.get_pixel(x, y)[0] as usize;
        self.components.get(label).copied().flatten().map(|c| c.area)
    }
}

fn collect_stable_regions(
    image: &GrayImage,
    found: &mut Vec<StableRegion>,
    seen: &mut HashSet<(PixelBox, u64)>,
) {
    let mut looser: Option<Level> = None;

    for threshold in (0..u8::MAX).step_by(STABLE_REGION_DELTA as usize) {
        let level = Level::at(image, threshold);
        if level.is_empty() {
            // Higher thresholds only shrink the foreground
            break;
        }

        if let Some(looser) = &looser {
            for stats in level.components.iter().flatten() {
                if !(STABLE_REGION_MIN_AREA..=STABLE_REGION_MAX_AREA).contains(&stats.area) {
                    continue;
                }
                let Some(enclosing_area) = looser.area_at(stats.seed.0, stats.seed.1) else {
                    continue;
                };
                let variation =
                    enclosing_area.saturating_sub(stats.area) as f32 / stats.area as f32;
                if variation > STABLE_REGION_MAX_VARIATION {
                    continue;
                }

                let bounds = stats.bounds();
                if seen.insert((bounds, stats.area)) {
                    found.push(StableRegion {
                        bounds,
                        pixel_count: stats.area,
                    });
                }
            }
        }

        looser = Some(level);
    }
}
