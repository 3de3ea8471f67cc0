// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod version;
pub mod vision;

// Re-export main types
pub use vision::detection::{
    DetectionConfig, DetectionError, DetectionMethod, DetectionStats, SmartAreaDetector,
    TextRegion,
};
