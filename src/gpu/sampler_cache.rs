//! Deduplication of sampler objects.
//!
//! Most textures share one of a handful of filter/wrap/anisotropy/LOD
//! combinations, so images look their sampler up here instead of creating
//! one each. The cache is a fixed-capacity linear array and never evicts.

use super::{BorderColor, Filter, ImageInfo, Wrap};

#[cfg(feature = "slotgfx-serde")]
use serde::{Deserialize, Serialize};

/// Backend sampler object. 0 means "no sampler".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct SamplerId(pub u64);

impl SamplerId {
    pub fn valid(&self) -> bool {
        self.0 != 0
    }
}

/// LOD clamps are stored as `lod * 1000` truncated, so keys compare exactly.
fn quantize_lod(lod: f32) -> i32 {
    (lod * 1000.0) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "slotgfx-serde", derive(Serialize, Deserialize))]
pub struct SamplerCacheKey {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_u: Wrap,
    pub wrap_v: Wrap,
    pub wrap_w: Wrap,
    pub border_color: BorderColor,
    pub max_anisotropy: u32,
    pub min_lod: i32,
    pub max_lod: i32,
}

impl SamplerCacheKey {
    pub fn new(
        min_filter: Filter,
        mag_filter: Filter,
        wrap: [Wrap; 3],
        border_color: BorderColor,
        max_anisotropy: u32,
        min_lod: f32,
        max_lod: f32,
    ) -> Self {
        Self {
            min_filter,
            mag_filter,
            wrap_u: wrap[0],
            wrap_v: wrap[1],
            wrap_w: wrap[2],
            border_color,
            max_anisotropy,
            min_lod: quantize_lod(min_lod),
            max_lod: quantize_lod(max_lod),
        }
    }

    /// Key for an image description with defaults already resolved.
    pub fn from_image_info(info: &ImageInfo) -> Self {
        Self::new(
            info.min_filter,
            info.mag_filter,
            [info.wrap_u, info.wrap_v, info.wrap_w],
            info.border_color,
            info.max_anisotropy,
            info.min_lod,
            info.max_lod,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerCacheEntry {
    pub key: SamplerCacheKey,
    pub sampler: SamplerId,
}

#[derive(Debug)]
pub struct SamplerCache {
    capacity: usize,
    entries: Vec<SamplerCacheEntry>,
}

impl SamplerCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn find(&self, key: &SamplerCacheKey) -> Option<SamplerId> {
        self.entries
            .iter()
            .find(|e| e.key == *key)
            .map(|e| e.sampler)
    }

    /// Append a new entry.
    ///
    /// # Panics
    /// When the cache is full. Sizing the cache is the embedder's job.
    pub fn add(&mut self, key: SamplerCacheKey, sampler: SamplerId) {
        assert!(
            !self.is_full(),
            "sampler cache full ({} entries), raise Desc::sampler_cache_size",
            self.capacity
        );
        self.entries.push(SamplerCacheEntry { key, sampler });
    }

    pub fn entries(&self) -> &[SamplerCacheEntry] {
        &self.entries
    }

    /// Empty the cache, handing back every entry so the samplers can be
    /// destroyed.
    pub fn drain(&mut self) -> Vec<SamplerCacheEntry> {
        std::mem::take(&mut self.entries)
    }
}
