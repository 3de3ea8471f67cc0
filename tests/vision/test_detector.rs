// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! SmartAreaDetector pipeline tests: caching, statistics, limits and sharing

use image::{DynamicImage, GrayImage, Luma};
use smart_area_detection::vision::detection::{DetectionConfig, DetectionMethod, SmartAreaDetector};
use std::sync::Arc;
use std::time::Duration;

fn capture(rects: &[(u32, u32, u32, u32)]) -> DynamicImage {
    let mut img = GrayImage::new(320, 240);
    for &(rx, ry, rw, rh) in rects {
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    DynamicImage::ImageLuma8(img)
}

/// Twelve 40x20 blocks on a 4x3 grid
fn grid_capture() -> DynamicImage {
    let mut rects = Vec::new();
    for row in 0..3 {
        for col in 0..4 {
            rects.push((10 + col * 80, 10 + row * 80, 40, 20));
        }
    }
    capture(&rects)
}

// =============================================================================
// Cache
// =============================================================================

#[test]
fn test_cache_hit_bypasses_stats() {
    let detector = SmartAreaDetector::default();
    let img = capture(&[(40, 40, 80, 30)]);

    let first = detector.detect_text_regions(&img, None);
    assert_eq!(detector.get_detection_stats().total_detections, 1);

    let second = detector.detect_text_regions(&img.clone(), None);
    assert_eq!(second, first);
    assert_eq!(detector.get_detection_stats().total_detections, 1);
    assert_eq!(detector.cache_len(), 1);
}

#[test]
fn test_different_method_is_a_cache_miss() {
    let detector = SmartAreaDetector::default();
    let img = capture(&[(40, 40, 80, 30)]);

    detector.detect_text_regions(&img, Some(DetectionMethod::Hybrid));
    detector.detect_text_regions(&img, Some(DetectionMethod::ContourBased));

    let stats = detector.get_detection_stats();
    assert_eq!(stats.total_detections, 2);
    assert_eq!(stats.cache_size, 2);
}

#[test]
fn test_expired_entry_purged_by_next_detection() {
    let detector = SmartAreaDetector::new(DetectionConfig {
        cache_max_age: 0.05,
        ..Default::default()
    });
    let first = capture(&[(40, 40, 80, 30)]);
    let second = capture(&[(150, 100, 80, 30)]);

    detector.detect_text_regions(&first, None);
    assert_eq!(detector.cache_len(), 1);

    std::thread::sleep(Duration::from_millis(120));
    detector.detect_text_regions(&second, None);
    assert_eq!(detector.cache_len(), 1);

    // The first image is recomputed, not served from cache
    detector.detect_text_regions(&first, None);
    assert_eq!(detector.get_detection_stats().total_detections, 3);
}

#[test]
fn test_clear_cache() {
    let detector = SmartAreaDetector::default();
    detector.detect_text_regions(&capture(&[(40, 40, 80, 30)]), None);
    assert_eq!(detector.cache_len(), 1);

    detector.clear_cache();
    assert_eq!(detector.cache_len(), 0);
}

// =============================================================================
// Result invariants
// =============================================================================

#[test]
fn test_results_capped_at_max_regions() {
    let detector = SmartAreaDetector::default();
    let regions = detector.detect_text_regions(&grid_capture(), Some(DetectionMethod::ContourBased));
    assert_eq!(regions.len(), 10);

    detector.update_config(DetectionConfig {
        max_regions: 4,
        ..Default::default()
    });
    let regions = detector.detect_text_regions(&grid_capture(), Some(DetectionMethod::ContourBased));
    assert_eq!(regions.len(), 4);
}

#[test]
fn test_results_respect_min_region_size() {
    let detector = SmartAreaDetector::new(DetectionConfig {
        min_region_size: 1000,
        ..Default::default()
    });
    // 40x20 blocks (800px) and one 60x30 block (1800px)
    let img = capture(&[(10, 10, 40, 20), (100, 10, 40, 20), (200, 150, 60, 30)]);

    for method in DetectionMethod::ALL {
        let regions = detector.detect_text_regions(&img, Some(method));
        assert!(
            regions.iter().all(|r| r.area() >= 1000),
            "{} returned an undersized region",
            method
        );
    }
}

#[test]
fn test_results_sorted_by_confidence() {
    let detector = SmartAreaDetector::default();
    let regions = detector.detect_text_regions(&grid_capture(), None);
    assert!(!regions.is_empty());
    assert!(regions
        .windows(2)
        .all(|pair| pair[0].confidence() >= pair[1].confidence()));
}

#[test]
fn test_oversized_preprocessing_settings_still_detect() {
    let detector = SmartAreaDetector::new(DetectionConfig {
        resize_factor: 1.0e9,
        blur_kernel_size: u32::MAX,
        enable_caching: false,
        max_processing_time: 60.0,
        ..Default::default()
    });
    let img = capture(&[(60, 45, 200, 150)]);

    let regions = detector.detect_text_regions(&img, Some(DetectionMethod::ContourBased));
    assert!(!regions.is_empty());

    let (cx, cy) = detector.get_best_region(&regions).unwrap().center();
    assert!(cx.abs_diff(160) <= 10, "center x was {}", cx);
    assert!(cy.abs_diff(120) <= 10, "center y was {}", cy);
    assert_eq!(detector.get_detection_stats().total_detections, 1);
}

// =============================================================================
// Method selection
// =============================================================================

#[test]
fn test_ml_request_is_served_by_fallbacks() {
    let detector = SmartAreaDetector::default();
    let img = capture(&[(40, 40, 80, 30)]);

    let regions = detector.detect_text_regions(&img, Some(DetectionMethod::MlBased));
    assert_eq!(regions.len(), 1);
    assert_eq!(
        detector.get_detection_stats().method_usage[&DetectionMethod::MlBased],
        1
    );
}

#[test]
fn test_detect_by_name() {
    let detector = SmartAreaDetector::default();
    let img = capture(&[(40, 40, 80, 30)]);

    assert_eq!(detector.detect_text_regions_by_name(&img, "contour_based").len(), 1);
    assert_eq!(detector.detect_text_regions_by_name(&img, "mser").len(), 1);
    assert!(detector.detect_text_regions_by_name(&img, "yolo").is_empty());
}

#[test]
fn test_primary_method_from_config() {
    let detector = SmartAreaDetector::new(DetectionConfig {
        primary_method: DetectionMethod::EdgeDetection,
        ..Default::default()
    });
    detector.detect_text_regions(&capture(&[(40, 40, 80, 30)]), None);

    let stats = detector.get_detection_stats();
    assert_eq!(stats.method_usage[&DetectionMethod::EdgeDetection], 1);
    assert_eq!(stats.method_usage[&DetectionMethod::Hybrid], 0);
    assert_eq!(stats.config.primary_method, DetectionMethod::EdgeDetection);
}

// =============================================================================
// Statistics
// =============================================================================

#[test]
fn test_stats_before_any_detection() {
    let stats = SmartAreaDetector::default().get_detection_stats();
    assert_eq!(stats.total_detections, 0);
    assert_eq!(stats.average_time_seconds, 0.0);
    assert_eq!(stats.cache_size, 0);
    assert_eq!(stats.method_usage.len(), DetectionMethod::ALL.len());
    assert_eq!(stats.config.max_regions, 10);
    assert_eq!(stats.config.min_region_size, 400);
    assert_eq!(stats.cache_expired, 0);
    assert_eq!(stats.cache_capacity, 64);
}

#[test]
fn test_stats_count_expired_cache_entries() {
    let detector = SmartAreaDetector::new(DetectionConfig {
        cache_max_age: 0.05,
        cache_max_entries: 8,
        ..Default::default()
    });
    detector.detect_text_regions(&capture(&[(40, 40, 80, 30)]), None);

    let fresh = detector.get_detection_stats();
    assert_eq!(fresh.cache_size, 1);
    assert_eq!(fresh.cache_expired, 0);
    assert_eq!(fresh.cache_capacity, 8);

    std::thread::sleep(Duration::from_millis(120));
    let stale = detector.get_detection_stats();
    assert_eq!(stale.cache_size, 1);
    assert_eq!(stale.cache_expired, 1);
}

#[test]
fn test_stats_timing_summary() {
    let detector = SmartAreaDetector::new(DetectionConfig {
        enable_caching: false,
        ..Default::default()
    });
    let img = capture(&[(40, 40, 80, 30)]);
    for _ in 0..3 {
        detector.detect_text_regions(&img, None);
    }

    let stats = detector.get_detection_stats();
    assert_eq!(stats.total_detections, 3);
    assert!(stats.min_time_seconds <= stats.average_time_seconds);
    assert!(stats.average_time_seconds <= stats.max_time_seconds);
    assert!(stats.std_dev_time_seconds >= 0.0);
    assert_eq!(stats.method_usage[&DetectionMethod::Hybrid], 3);
}

// =============================================================================
// Helpers and sharing
// =============================================================================

#[test]
fn test_best_region_and_size_filter() {
    let detector = SmartAreaDetector::default();
    let img = capture(&[(10, 10, 40, 20), (150, 100, 120, 60)]);
    let regions = detector.detect_text_regions(&img, Some(DetectionMethod::ContourBased));
    assert_eq!(regions.len(), 2);

    let best = detector.get_best_region(&regions).unwrap();
    assert_eq!(best.area(), 7200);

    let small = detector.filter_regions_by_size(&regions, 0, Some(1000));
    assert_eq!(small.len(), 1);
    assert_eq!(small[0].area(), 800);
}

#[test]
fn test_detector_shared_across_threads() {
    let detector = Arc::new(SmartAreaDetector::default());
    let images: Vec<DynamicImage> = (0..4)
        .map(|i| capture(&[(20 + i * 60, 40, 50, 30)]))
        .collect();

    std::thread::scope(|scope| {
        for img in &images {
            let detector = Arc::clone(&detector);
            scope.spawn(move || {
                let regions = detector.detect_text_regions(img, None);
                assert_eq!(regions.len(), 1);
            });
        }
    });

    let stats = detector.get_detection_stats();
    assert_eq!(stats.total_detections, 4);
    assert_eq!(stats.cache_size, 4);
}
