// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Filtering, merging, ranking and scoring of detected regions

use std::cmp::Ordering;

use super::config::DetectionConfig;
use super::region::{DetectionMethod, TextRegion};

/// Area treated as "large enough" by the size term of `region_score`
pub const REFERENCE_TEXT_AREA: f32 = 10_000.0;

/// Filter, merge, rank and cap a pooled candidate list
///
/// Steps:
/// 1. Drop regions smaller than `min_region_size`
/// 2. Merge overlapping regions when `merge_overlapping` is set
/// 3. Sort by confidence, highest first
/// 4. Keep the first `max_regions`
pub fn post_process_regions(regions: Vec<TextRegion>, config: &DetectionConfig) -> Vec<TextRegion> {
    let mut kept: Vec<TextRegion> = regions
        .into_iter()
        .filter(|r| r.area() >= config.min_region_size)
        .collect();

    if config.merge_overlapping {
        kept = merge_overlapping_regions(&kept, config.overlap_threshold);
    }

    kept.sort_by(|a, b| {
        b.confidence()
            .partial_cmp(&a.confidence())
            .unwrap_or(Ordering::Equal)
    });
    kept.truncate(config.max_regions);
    kept
}

/// Copy of `regions` sorted top-to-bottom, then left-to-right
///
/// Both merge passes are greedy, so they start from this order to give the
/// same result whatever order the strategies produced their candidates in.
pub fn canonical_order(regions: &[TextRegion]) -> Vec<TextRegion> {
    let mut ordered = regions.to_vec();
    ordered.sort_by_key(|r| (r.y(), r.x(), r.height(), r.width()));
    ordered
}

/// Greedy overlap merge
///
/// Each unconsumed region absorbs every later unconsumed region whose overlap
/// ratio with it reaches `threshold`. The merged box is the union, confidence
/// the maximum, and density the running pairwise mean. Never returns more
/// regions than it was given.
pub fn merge_overlapping_regions(regions: &[TextRegion], threshold: f32) -> Vec<TextRegion> {
    if regions.len() <= 1 {
        return regions.to_vec();
    }

    let ordered = canonical_order(regions);
    let mut consumed = vec![false; ordered.len()];
    let mut merged = Vec::with_capacity(ordered.len());

    for i in 0..ordered.len() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;

        let seed = &ordered[i];
        let mut current = seed.clone();
        for j in (i + 1)..ordered.len() {
            if consumed[j] || !seed.overlaps_with(&ordered[j], threshold) {
                continue;
            }
            let other = &ordered[j];
            current = TextRegion::from_corners(
                current.union_corners(other),
                current.confidence().max(other.confidence()),
                (current.text_density() + other.text_density()) / 2.0,
                DetectionMethod::Hybrid,
            );
            consumed[j] = true;
        }
        merged.push(current);
    }

    merged
}

/// True when two regions overlap by `threshold` or their centers are closer
/// than half the largest side of either
pub fn are_regions_similar(a: &TextRegion, b: &TextRegion, threshold: f32) -> bool {
    if a.overlaps_with(b, threshold) {
        return true;
    }

    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let dx = ax as f64 - bx as f64;
    let dy = ay as f64 - by as f64;
    let distance = (dx * dx + dy * dy).sqrt();

    let max_dimension = a.width().max(a.height()).max(b.width()).max(b.height()) as f64;
    distance < max_dimension * 0.5
}

/// Group similar regions and collapse each group into one hybrid region
///
/// Grouping is greedy: each ungrouped region collects every later ungrouped
/// region similar to it. A group of two or more becomes the union box with
/// mean confidence and mean density; a lone region passes through unchanged.
pub fn merge_similar_regions(regions: &[TextRegion], threshold: f32) -> Vec<TextRegion> {
    let ordered = canonical_order(regions);
    let mut grouped = vec![false; ordered.len()];
    let mut fused = Vec::new();

    for i in 0..ordered.len() {
        if grouped[i] {
            continue;
        }
        grouped[i] = true;

        let mut group = vec![&ordered[i]];
        for j in (i + 1)..ordered.len() {
            if !grouped[j] && are_regions_similar(&ordered[i], &ordered[j], threshold) {
                group.push(&ordered[j]);
                grouped[j] = true;
            }
        }
        if group.len() == 1 {
            fused.push(ordered[i].clone());
        } else {
            fused.push(fuse_group(&group));
        }
    }

    fused
}

fn fuse_group(group: &[&TextRegion]) -> TextRegion {
    let first = group[0];
    let mut corners = first.coordinates();
    let mut confidence_sum = 0.0f32;
    let mut density_sum = 0.0f32;

    for region in group {
        let (x1, y1, x2, y2) = region.coordinates();
        corners = (
            corners.0.min(x1),
            corners.1.min(y1),
            corners.2.max(x2),
            corners.3.max(y2),
        );
        confidence_sum += region.confidence();
        density_sum += region.text_density();
    }

    let count = group.len() as f32;
    TextRegion::from_corners(
        corners,
        confidence_sum / count,
        density_sum / count,
        DetectionMethod::Hybrid,
    )
}

/// Ranking score: half confidence, 30% size (saturating at
/// `REFERENCE_TEXT_AREA`), 20% text density
pub fn region_score(region: &TextRegion) -> f32 {
    let size_score = (region.area() as f32 / REFERENCE_TEXT_AREA).min(1.0);
    region.confidence() * 0.5 + size_score * 0.3 + region.text_density() * 0.2
}

/// Highest-scoring region; the first one wins ties
pub fn get_best_region(regions: &[TextRegion]) -> Option<&TextRegion> {
    regions.iter().fold(None, |best, candidate| match best {
        Some(current) if region_score(current) >= region_score(candidate) => Some(current),
        _ => Some(candidate),
    })
}

/// Regions with `min_area <= area`, and `area <= max_area` when given
pub fn filter_regions_by_size(
    regions: &[TextRegion],
    min_area: u64,
    max_area: Option<u64>,
) -> Vec<TextRegion> {
    regions
        .iter()
        .filter(|r| r.area() >= min_area && max_area.map_or(true, |max| r.area() <= max))
        .cloned()
        .collect()
}
