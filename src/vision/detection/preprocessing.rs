// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing shared by every detection strategy

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};
use imageproc::filter::median_filter;
use std::borrow::Cow;
use tracing::{debug, warn};

use super::config::{DetectionConfig, MAX_BLUR_KERNEL_SIZE};

/// Largest resized image, in pixels, that preprocessing will allocate
pub const MAX_DETECTION_PIXELS: u64 = 64 * 1024 * 1024;

/// Prepare a raw capture for detection
///
/// Steps:
/// 1. Scale by `resize_factor` (skipped at 1.0)
/// 2. Convert to single-channel grayscale
/// 3. Median blur with `blur_kernel_size` when noise reduction is enabled
///
/// Regions found on the result are in the resized coordinate space. A step
/// that cannot run with the given settings is skipped, never fatal.
pub fn preprocess_image(image: &DynamicImage, config: &DetectionConfig) -> GrayImage {
    let resized = resize_for_detection(image, config.resize_factor);
    let gray = resized.to_luma8();

    if !config.apply_noise_reduction {
        return gray;
    }

    match blur_radius(config.blur_kernel_size) {
        Some(radius) => {
            // A window wider than the image adds nothing
            let radius = radius.min(gray.width().max(gray.height()));
            median_filter(&gray, radius, radius)
        }
        None => gray,
    }
}

/// Scale both dimensions by `factor`, truncating to whole pixels
fn resize_for_detection(image: &DynamicImage, factor: f32) -> Cow<'_, DynamicImage> {
    if factor == 1.0 {
        return Cow::Borrowed(image);
    }

    let (width, height) = image.dimensions();
    if !factor.is_finite() || factor <= 0.0 {
        warn!("Ignoring unusable resize factor {}", factor);
        return Cow::Borrowed(image);
    }

    let new_width = (width as f64 * factor as f64).floor();
    let new_height = (height as f64 * factor as f64).floor();
    if new_width * new_height > MAX_DETECTION_PIXELS as f64 {
        warn!(
            "Resize factor {} would grow {}x{} image past {} pixels, keeping original size",
            factor, width, height, MAX_DETECTION_PIXELS
        );
        return Cow::Borrowed(image);
    }

    let new_width = new_width as u32;
    let new_height = new_height as u32;
    if new_width == 0 || new_height == 0 {
        warn!(
            "Resize factor {} collapses {}x{} image, keeping original size",
            factor, width, height
        );
        return Cow::Borrowed(image);
    }

    debug!(
        "Resizing {}x{} -> {}x{} for detection",
        width, height, new_width, new_height
    );
    Cow::Owned(image.resize_exact(new_width, new_height, FilterType::Triangle))
}

/// Median filter radius for an odd kernel size; even sizes round up and
/// sizes above `MAX_BLUR_KERNEL_SIZE` are capped
fn blur_radius(kernel_size: u32) -> Option<u32> {
    if kernel_size <= 1 {
        return None;
    }
    if kernel_size > MAX_BLUR_KERNEL_SIZE {
        warn!(
            "Blur kernel size {} exceeds {}, capping",
            kernel_size, MAX_BLUR_KERNEL_SIZE
        );
        return Some(MAX_BLUR_KERNEL_SIZE / 2);
    }
    let kernel = if kernel_size % 2 == 0 {
        warn!("Blur kernel size {} is even, using {}", kernel_size, kernel_size + 1);
        kernel_size + 1
    } else {
        kernel_size
    };
    Some(kernel / 2)
}
