// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Placeholder for a learned text detector (EAST, CRAFT and similar)

use image::GrayImage;

use super::DetectionStrategy;
use crate::vision::detection::config::DetectionConfig;
use crate::vision::detection::error::DetectionError;
use crate::vision::detection::region::{DetectionMethod, TextRegion};

/// Always reports `DetectionError::NotImplemented`
///
/// Selecting it is safe: the dispatcher logs a warning and returns no
/// regions, keeping "unsupported" distinguishable from "found nothing".
#[derive(Debug, Clone, Copy, Default)]
pub struct MlStrategy;

impl DetectionStrategy for MlStrategy {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::MlBased
    }

    fn detect(
        &self,
        _image: &GrayImage,
        _config: &DetectionConfig,
    ) -> Result<Vec<TextRegion>, DetectionError> {
        Err(DetectionError::NotImplemented(DetectionMethod::MlBased))
    }
}
