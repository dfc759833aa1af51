//! # Tile Memoization
//!
//! A tile is a pure function of (layer, weather, transition, table), so
//! repeated requests between table rebuilds can be served from memory.
//! The cache is cleared whenever the table changes.
//!
//! Hits hand out clones: callers always own a fresh tile.

use std::collections::HashMap;

use cirrus_procedural::{CloudImage, CloudResult, Weather};

/// Memoization key for one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureKey {
    layer: u32,
    weather: Weather,
    transition_bits: u64,
}

impl TextureKey {
    /// Builds a key. `layer` must already be wrapped into the layer range.
    #[must_use]
    pub fn new(layer: u32, weather: Weather, transition: f64) -> Self {
        // Adding 0.0 folds -0.0 into 0.0 so both hit the same entry.
        let transition = transition.clamp(0.0, 1.0) + 0.0;
        Self {
            layer,
            weather,
            transition_bits: transition.to_bits(),
        }
    }

    /// Layer this tile was painted for.
    #[must_use]
    pub const fn layer(&self) -> u32 {
        self.layer
    }

    /// Weather this tile was painted for.
    #[must_use]
    pub const fn weather(&self) -> Weather {
        self.weather
    }

    /// Transition this tile was painted for.
    #[must_use]
    pub fn transition(&self) -> f64 {
        f64::from_bits(self.transition_bits)
    }
}

/// Cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from memory.
    pub hits: u64,
    /// Requests that synthesized a tile.
    pub misses: u64,
    /// Times the cache was emptied for being full.
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of requests served from memory.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded tile cache.
///
/// When full, the whole cache is dropped before inserting. During a
/// day/night sweep every tick produces a new transition, so older entries
/// would never be requested again anyway.
#[derive(Debug)]
pub struct TextureCache {
    entries: HashMap<TextureKey, CloudImage>,
    capacity: usize,
    stats: CacheStats,
}

impl TextureCache {
    /// Creates a cache holding at most `capacity` tiles (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Returns a copy of the cached tile, synthesizing it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the error of `synthesize`; nothing is cached in that case.
    pub fn get_or_try_insert_with<F>(
        &mut self,
        key: TextureKey,
        synthesize: F,
    ) -> CloudResult<CloudImage>
    where
        F: FnOnce() -> CloudResult<CloudImage>,
    {
        if let Some(image) = self.entries.get(&key) {
            self.stats.hits += 1;
            tracing::trace!("tile cache hit: {key:?}");
            return Ok(image.clone());
        }

        let image = synthesize()?;
        self.stats.misses += 1;
        tracing::trace!("tile cache miss: {key:?}");

        if self.entries.len() >= self.capacity {
            self.entries.clear();
            self.stats.evictions += 1;
        }
        self.entries.insert(key, image.clone());
        Ok(image)
    }

    /// Drops every cached tile.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached tiles.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hit/miss counters.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}
