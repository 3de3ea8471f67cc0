// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for smart area detection

use thiserror::Error;

use super::region::DetectionMethod;

/// Failures raised inside a single detection strategy
///
/// These never escape `SmartAreaDetector::detect_text_regions`; the strategy
/// dispatcher logs them and substitutes an empty region list.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Image dimensions {width}x{height} are not usable: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Image primitive '{primitive}' failed: {reason}")]
    Primitive {
        primitive: &'static str,
        reason: String,
    },

    #[error("Detection method '{0}' is not implemented")]
    NotImplemented(DetectionMethod),

    #[error("Unknown detection method: {0}")]
    UnknownMethod(String),
}

/// Errors produced while loading or validating a `DetectionConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
