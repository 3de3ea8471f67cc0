// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detected text region and detection method tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DetectionError;

/// Detection strategy that produced a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Otsu binarisation followed by external contour bounding boxes
    ContourBased,
    /// Canny edges, dilated into blobs, then contour bounding boxes
    EdgeDetection,
    /// Stable extremal regions (MSER-style blobs)
    TextDetection,
    /// Learned text detector. Not available in this build.
    MlBased,
    /// Fusion of contour, edge and blob results
    Hybrid,
}

impl DetectionMethod {
    /// Every method, in a fixed order
    pub const ALL: [DetectionMethod; 5] = [
        DetectionMethod::ContourBased,
        DetectionMethod::EdgeDetection,
        DetectionMethod::TextDetection,
        DetectionMethod::MlBased,
        DetectionMethod::Hybrid,
    ];

    /// Stable string tag used in config files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::ContourBased => "contour_based",
            DetectionMethod::EdgeDetection => "edge_detection",
            DetectionMethod::TextDetection => "text_detection",
            DetectionMethod::MlBased => "ml_based",
            DetectionMethod::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionMethod {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contour_based" | "contour" => Ok(DetectionMethod::ContourBased),
            "edge_detection" | "edge" => Ok(DetectionMethod::EdgeDetection),
            "text_detection" | "blob" | "mser" => Ok(DetectionMethod::TextDetection),
            "ml_based" | "ml" => Ok(DetectionMethod::MlBased),
            "hybrid" => Ok(DetectionMethod::Hybrid),
            other => Err(DetectionError::UnknownMethod(other.to_string())),
        }
    }
}

/// A candidate text rectangle in processed-image coordinates
///
/// Regions are immutable once built. Merge passes construct new regions
/// rather than editing existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    confidence: f32,
    text_density: f32,
    method: DetectionMethod,
}

impl TextRegion {
    pub fn new(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        confidence: f32,
        text_density: f32,
        method: DetectionMethod,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
            text_density,
            method,
        }
    }

    /// Build a region spanning the corners `(x1, y1)` to `(x2, y2)` (exclusive)
    pub(crate) fn from_corners(
        (x1, y1, x2, y2): (u32, u32, u32, u32),
        confidence: f32,
        text_density: f32,
        method: DetectionMethod,
    ) -> Self {
        Self::new(
            x1,
            y1,
            x2.saturating_sub(x1),
            y2.saturating_sub(y1),
            confidence,
            text_density,
            method,
        )
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn text_density(&self) -> f32 {
        self.text_density
    }

    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    /// Area in pixels
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width over height, 0.0 for a zero-height region
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Corners as `(x1, y1, x2, y2)` with the bottom-right exclusive
    pub fn coordinates(&self) -> (u32, u32, u32, u32) {
        (
            self.x,
            self.y,
            self.x.saturating_add(self.width),
            self.y.saturating_add(self.height),
        )
    }

    /// Integer center point
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Inclusive point test: points on the right and bottom edges count as inside
    pub fn contains_point(&self, px: u32, py: u32) -> bool {
        let (x1, y1, x2, y2) = self.coordinates();
        x1 <= px && px <= x2 && y1 <= py && py <= y2
    }

    /// Intersection over union of the two rectangles
    ///
    /// Returns 0.0 for disjoint rectangles and when the union is empty.
    pub fn overlap_ratio(&self, other: &TextRegion) -> f32 {
        let (x1, y1, x2, y2) = self.coordinates();
        let (ox1, oy1, ox2, oy2) = other.coordinates();

        let ix1 = x1.max(ox1);
        let iy1 = y1.max(oy1);
        let ix2 = x2.min(ox2);
        let iy2 = y2.min(oy2);

        if ix1 >= ix2 || iy1 >= iy2 {
            return 0.0;
        }

        let intersection = (ix2 - ix1) as u64 * (iy2 - iy1) as u64;
        let union = self.area() + other.area() - intersection;
        if union == 0 {
            return 0.0;
        }

        (intersection as f64 / union as f64) as f32
    }

    /// True when the rectangles share area and `overlap_ratio(other) >= threshold`
    ///
    /// Disjoint or touching rectangles never overlap, even at threshold 0.
    pub fn overlaps_with(&self, other: &TextRegion, threshold: f32) -> bool {
        let ratio = self.overlap_ratio(other);
        ratio > 0.0 && ratio >= threshold
    }

    /// Corners of the smallest rectangle covering both regions
    pub(crate) fn union_corners(&self, other: &TextRegion) -> (u32, u32, u32, u32) {
        let (x1, y1, x2, y2) = self.coordinates();
        let (ox1, oy1, ox2, oy2) = other.coordinates();
        (x1.min(ox1), y1.min(oy1), x2.max(ox2), y2.max(oy2))
    }
}
