// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Interchangeable text region detectors
//!
//! Components:
//! - `contour` - Otsu binarisation and external contour boxes
//! - `edge` - Canny edges dilated into blobs
//! - `blob` - Stable extremal regions (MSER-style)
//! - `ml` - Placeholder for a learned detector
//! - `hybrid` - Runs contour, edge and blob, then fuses similar boxes
//!
//! Every strategy works on the preprocessed grayscale image. Failures stay
//! inside the strategy boundary: `run_strategy` logs them and yields no regions.

pub mod blob;
pub mod contour;
pub mod edge;
pub mod hybrid;
pub mod ml;

pub use blob::{detect_stable_regions, BlobStrategy, StableRegion};
pub use contour::ContourStrategy;
pub use edge::EdgeStrategy;
pub use hybrid::HybridStrategy;
pub use ml::MlStrategy;

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::otsu_level;
use std::time::Instant;
use tracing::{error, warn};

use super::config::DetectionConfig;
use super::error::DetectionError;
use super::region::{DetectionMethod, TextRegion};

/// A single detection algorithm
pub trait DetectionStrategy {
    /// Tag attached to the regions this strategy produces
    fn method(&self) -> DetectionMethod;

    /// Find candidate regions in a preprocessed grayscale image
    fn detect(
        &self,
        image: &GrayImage,
        config: &DetectionConfig,
    ) -> Result<Vec<TextRegion>, DetectionError>;
}

impl DetectionMethod {
    /// Strategy implementing this method
    pub fn strategy(self) -> Box<dyn DetectionStrategy> {
        self.strategy_with_deadline(None)
    }

    pub(crate) fn strategy_with_deadline(
        self,
        deadline: Option<Instant>,
    ) -> Box<dyn DetectionStrategy> {
        match self {
            DetectionMethod::ContourBased => Box::new(ContourStrategy),
            DetectionMethod::EdgeDetection => Box::new(EdgeStrategy),
            DetectionMethod::TextDetection => Box::new(BlobStrategy),
            DetectionMethod::MlBased => Box::new(MlStrategy),
            DetectionMethod::Hybrid => Box::new(HybridStrategy::with_deadline(deadline)),
        }
    }
}

/// Run one strategy, turning any failure into an empty list
pub fn run_strategy(
    method: DetectionMethod,
    image: &GrayImage,
    config: &DetectionConfig,
) -> Vec<TextRegion> {
    run_strategy_until(method, image, config, None)
}

pub(crate) fn run_strategy_until(
    method: DetectionMethod,
    image: &GrayImage,
    config: &DetectionConfig,
    deadline: Option<Instant>,
) -> Vec<TextRegion> {
    match method.strategy_with_deadline(deadline).detect(image, config) {
        Ok(regions) => regions,
        Err(DetectionError::NotImplemented(method)) => {
            warn!(
                "{} detection is not implemented (requires trained models), no regions produced",
                method
            );
            Vec::new()
        }
        Err(e) => {
            error!("{} detection failed: {}", method, e);
            Vec::new()
        }
    }
}

pub(crate) fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Smallest box containing every point, `None` for no points
    pub(crate) fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut points = points.into_iter();
        let (first_x, first_y) = points.next()?;
        let (min_x, min_y, max_x, max_y) = points.fold(
            (first_x, first_y, first_x, first_y),
            |(min_x, min_y, max_x, max_y), (x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        );
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }
}

pub(crate) fn ensure_not_empty(image: &GrayImage) -> Result<(), DetectionError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DetectionError::EmptyImage { width, height });
    }
    Ok(())
}

/// Binarise with an Otsu level: pixels above the level become 255
///
/// A flat image has no separable foreground and binarises to all zeros.
pub(crate) fn binarize_otsu(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let (lowest, highest) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
    if lowest >= highest {
        return GrayImage::new(width, height);
    }

    let level = otsu_level(image);
    threshold_above(image, level)
}

pub(crate) fn threshold_above(image: &GrayImage, level: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if image.get_pixel(x, y)[0] > level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Bounding boxes of outermost contours in a binary image
///
/// Only outer borders without a parent are kept, so components nested in
/// another component's hole are not reported.
pub(crate) fn external_bounding_boxes(binary: &GrayImage) -> Vec<PixelBox> {
    find_contours::<u32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| PixelBox::enclosing(c.points.iter().map(|p| (p.x, p.y))))
        .collect()
}

/// Fraction of non-zero pixels inside `bbox`
pub(crate) fn foreground_density(binary: &GrayImage, bbox: &PixelBox) -> f32 {
    let area = bbox.area();
    if area == 0 {
        return 0.0;
    }
    let (width, height) = binary.dimensions();
    let x_end = (bbox.x + bbox.width).min(width);
    let y_end = (bbox.y + bbox.height).min(height);

    let mut foreground = 0u64;
    for y in bbox.y..y_end {
        for x in bbox.x..x_end {
            if binary.get_pixel(x, y)[0] > 0 {
                foreground += 1;
            }
        }
    }
    foreground as f32 / area as f32
}
