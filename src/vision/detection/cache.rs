// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based cache of finished detection results

use image::{DynamicImage, GenericImageView};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::region::{DetectionMethod, TextRegion};

/// Hex characters kept from the SHA-256 digest
const CACHE_KEY_LEN: usize = 16;

/// Content-addressed cache from image digest to post-processed regions
///
/// Expired entries are not returned but stay in the map until
/// `purge_expired` or `clear` runs.
pub struct ResultCache {
    state: Mutex<CacheState>,
}

struct CacheState {
    entries: HashMap<String, CachedEntry>,
    ttl: Duration,
    max_entries: usize,
}

struct CachedEntry {
    regions: Vec<TextRegion>,
    inserted_at: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total entries in cache
    pub total: usize,
    /// Expired entries (not yet purged)
    pub expired: usize,
    /// Maximum cache capacity
    pub max: usize,
}

impl ResultCache {
    /// Create a cache whose entries live for `ttl`
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                ttl,
                max_entries,
            }),
        }
    }

    /// Cache key for one detection request
    ///
    /// Digests the raw pixel bytes (before preprocessing) together with the
    /// image shape, the requested method and a config fingerprint, then keeps
    /// the first `CACHE_KEY_LEN` hex characters.
    pub fn cache_key(image: &DynamicImage, method: DetectionMethod, config_fingerprint: &str) -> String {
        let (width, height) = image.dimensions();
        let mut hasher = Sha256::new();
        hasher.update(width.to_le_bytes());
        hasher.update(height.to_le_bytes());
        hasher.update(format!("{:?}", image.color()).as_bytes());
        hasher.update(method.as_str().as_bytes());
        hasher.update(config_fingerprint.as_bytes());
        hasher.update(image.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..CACHE_KEY_LEN].to_string()
    }

    /// Cached regions for `key`, `None` if absent or expired
    pub fn get(&self, key: &str) -> Option<Vec<TextRegion>> {
        let state = self.state.lock().ok()?;
        let entry = state.entries.get(key)?;

        if entry.inserted_at.elapsed() > state.ttl {
            return None; // Expired
        }

        Some(entry.regions.clone())
    }

    /// Store a finished result, evicting the oldest entry at capacity
    pub fn insert(&self, key: String, regions: &[TextRegion]) {
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(_) => return,
        };
        if state.max_entries == 0 {
            return;
        }

        if !state.entries.contains_key(&key) && state.entries.len() >= state.max_entries {
            state.evict_oldest();
        }

        state.entries.insert(
            key,
            CachedEntry {
                regions: regions.to_vec(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry older than the TTL, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(_) => return 0,
        };
        let ttl = state.ttl;
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
        before - state.entries.len()
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
        }
    }

    /// Change TTL and capacity; existing entries are kept
    pub fn reconfigure(&self, ttl: Duration, max_entries: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.ttl = ttl;
            state.max_entries = max_entries;
            while state.entries.len() > max_entries {
                state.evict_oldest();
            }
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let state = match self.state.lock() {
            Ok(s) => s,
            Err(_) => {
                return CacheStats {
                    total: 0,
                    expired: 0,
                    max: 0,
                }
            }
        };

        let expired = state
            .entries
            .values()
            .filter(|e| e.inserted_at.elapsed() > state.ttl)
            .count();

        CacheStats {
            total: state.entries.len(),
            expired,
            max: state.max_entries,
        }
    }
}

impl CacheState {
    fn evict_oldest(&mut self) {
        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, v)| v.inserted_at)
            .map(|(k, _)| k.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }
}
