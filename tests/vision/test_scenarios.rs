// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end detection scenarios on synthetic screenshots
//!
//! Every capture is a black 320x240 canvas with white filled rectangles,
//! which gives exact ground truth for the bounding boxes.

use image::{DynamicImage, GrayImage, Luma};
use smart_area_detection::vision::detection::{
    get_best_region, merge_overlapping_regions, run_strategy, DetectionConfig, DetectionMethod,
    SmartAreaDetector, TextRegion,
};

fn canvas(rects: &[(u32, u32, u32, u32)]) -> GrayImage {
    let mut img = GrayImage::new(320, 240);
    for &(rx, ry, rw, rh) in rects {
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    img
}

fn uncached() -> DetectionConfig {
    DetectionConfig {
        enable_caching: false,
        ..Default::default()
    }
}

fn assert_close(actual: u32, expected: u32, tolerance: u32, what: &str) {
    assert!(
        actual.abs_diff(expected) <= tolerance,
        "{} was {}, expected {} +/- {}",
        what,
        actual,
        expected,
        tolerance
    );
}

// =============================================================================
// Scenario 1: blank capture
// =============================================================================

#[test]
fn test_blank_capture_yields_nothing_from_every_strategy() {
    let img = canvas(&[]);
    let config = uncached();

    for method in DetectionMethod::ALL {
        assert!(
            run_strategy(method, &img, &config).is_empty(),
            "{} found regions on a blank capture",
            method
        );
    }

    let detector = SmartAreaDetector::new(config);
    let regions = detector.detect_text_regions(&DynamicImage::ImageLuma8(img), None);
    assert!(regions.is_empty());
    assert!(get_best_region(&regions).is_none());
}

#[test]
fn test_blank_light_capture_yields_nothing() {
    let img = GrayImage::from_pixel(320, 240, Luma([235]));
    let detector = SmartAreaDetector::new(uncached());

    for method in DetectionMethod::ALL {
        let regions = detector.detect_text_regions(&DynamicImage::ImageLuma8(img.clone()), Some(method));
        assert!(regions.is_empty(), "{} found regions", method);
    }
}

// =============================================================================
// Scenario 2: one rectangle, contour strategy
// =============================================================================

#[test]
fn test_single_rectangle_contour_bbox() {
    let img = canvas(&[(100, 80, 90, 40)]);

    let regions = run_strategy(DetectionMethod::ContourBased, &img, &uncached());
    assert_eq!(regions.len(), 1);

    let region = &regions[0];
    assert_close(region.x(), 100, 2, "x");
    assert_close(region.y(), 80, 2, "y");
    assert_close(region.width(), 90, 2, "width");
    assert_close(region.height(), 40, 2, "height");
    assert!(region.confidence() > 0.9);
}

#[test]
fn test_single_rectangle_contour_pipeline_without_fallbacks() {
    let detector = SmartAreaDetector::new(DetectionConfig {
        fallback_methods: vec![],
        ..uncached()
    });
    let img = DynamicImage::ImageLuma8(canvas(&[(100, 80, 90, 40)]));

    let regions = detector.detect_text_regions(&img, Some(DetectionMethod::ContourBased));
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].method(), DetectionMethod::ContourBased);
    assert_close(regions[0].x(), 100, 2, "x");
    assert_close(regions[0].width(), 90, 2, "width");
}

#[test]
fn test_single_rectangle_contour_pipeline_with_edge_fallback() {
    // One contour hit triggers the edge fallback; its dilated outline
    // overlaps the contour box and the two merge into a slightly wider box
    let detector = SmartAreaDetector::new(uncached());
    let img = DynamicImage::ImageLuma8(canvas(&[(100, 80, 90, 40)]));

    let regions = detector.detect_text_regions(&img, Some(DetectionMethod::ContourBased));
    assert_eq!(regions.len(), 1);

    let (x1, y1, x2, y2) = regions[0].coordinates();
    assert!(x1 <= 100 && y1 <= 80 && x2 >= 190 && y2 >= 120);
    assert!(x1 >= 94 && y1 >= 74 && x2 <= 196 && y2 <= 126);
    assert_eq!(regions[0].method(), DetectionMethod::Hybrid);
}

#[test]
fn test_single_rectangle_every_working_strategy_agrees() {
    let img = canvas(&[(100, 80, 90, 40)]);
    let config = uncached();

    for method in [
        DetectionMethod::ContourBased,
        DetectionMethod::EdgeDetection,
        DetectionMethod::TextDetection,
        DetectionMethod::Hybrid,
    ] {
        let regions = run_strategy(method, &img, &config);
        assert_eq!(regions.len(), 1, "{} region count", method);
        let (cx, cy) = regions[0].center();
        assert_close(cx, 145, 3, "center x");
        assert_close(cy, 100, 3, "center y");
    }
}

// =============================================================================
// Scenario 3: two distant rectangles stay separate
// =============================================================================

#[test]
fn test_two_distant_rectangles_hybrid_keeps_both() {
    let detector = SmartAreaDetector::new(uncached());
    let img = DynamicImage::ImageLuma8(canvas(&[(20, 20, 60, 30), (220, 150, 60, 30)]));

    let mut regions = detector.detect_text_regions(&img, Some(DetectionMethod::Hybrid));
    assert_eq!(regions.len(), 2);

    regions.sort_by_key(|r| r.x());
    assert_close(regions[0].x(), 20, 6, "first x");
    assert_close(regions[1].x(), 220, 6, "second x");
    assert!(regions.iter().all(|r| r.method() == DetectionMethod::Hybrid));
    assert_eq!(regions[0].overlap_ratio(&regions[1]), 0.0);
}

// =============================================================================
// Scenario 4: overlapping rectangles merge into their union
// =============================================================================

#[test]
fn test_half_overlapping_regions_merge_to_union() {
    let a = TextRegion::new(0, 0, 100, 50, 0.6, 0.4, DetectionMethod::ContourBased);
    let b = TextRegion::new(33, 0, 100, 50, 0.8, 0.2, DetectionMethod::EdgeDetection);
    let iou = a.overlap_ratio(&b);
    assert!((iou - 0.5).abs() < 0.01, "iou was {}", iou);

    let merged = merge_overlapping_regions(&[a, b], 0.3);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].coordinates(), (0, 0, 133, 50));
    assert!((merged[0].confidence() - 0.8).abs() < 1e-6);
    assert_eq!(merged[0].method(), DetectionMethod::Hybrid);
}

#[test]
fn test_overlapping_candidates_merge_in_pipeline() {
    // The two blocks form one connected shape spanning (50,50)-(183,110).
    // Every strategy reports it, and the edge outline sits a few pixels
    // outside, so the fused box covers the union with a small margin.
    let detector = SmartAreaDetector::new(uncached());
    let img = DynamicImage::ImageLuma8(canvas(&[(50, 50, 100, 50), (83, 60, 100, 50)]));

    let regions = detector.detect_text_regions(&img, None);
    assert_eq!(regions.len(), 1);

    let (x1, y1, x2, y2) = regions[0].coordinates();
    assert!(x1 <= 50 && y1 <= 50 && x2 >= 183 && y2 >= 110);
    assert!(x1 >= 44 && y1 >= 44 && x2 <= 189 && y2 <= 116);
}
