use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tiny_skia::{Path, Rect};
use tracing::trace;

use crate::font::FontId;
use crate::metrics::MetricsProvider;

/// Cache key for a glyph outline at a given pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub font: FontId,
    /// `f32::to_bits` of the pixel size.
    pub size_bits: u32,
    pub ch: char,
}

impl GlyphKey {
    pub fn new(font: FontId, font_size: f32, ch: char) -> Self {
        Self {
            font,
            size_bits: font_size.to_bits(),
            ch,
        }
    }
}

/// Outline of one glyph in pixels, y down, origin on the baseline.
#[derive(Debug, Clone)]
pub struct GlyphPath {
    pub path: Option<Path>,
    /// Tight bounds of the visible ink.
    pub ink: Option<Rect>,
}

impl GlyphPath {
    pub fn is_blank(&self) -> bool {
        self.path.is_none()
    }
}

/// Hit and miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// LRU-bounded glyph outline cache keyed by (font, size, char).
#[derive(Debug)]
pub struct GlyphPathCache {
    entries: LruCache<GlyphKey, Arc<GlyphPath>>,
    hits: u64,
    misses: u64,
}

impl Default for GlyphPathCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl GlyphPathCache {
    pub const DEFAULT_CAPACITY: usize = 512;

    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached outline for `ch`, building it on a miss.
    pub fn get_or_build(&mut self, metrics: &MetricsProvider, ch: char) -> Arc<GlyphPath> {
        let key = GlyphKey::new(metrics.font_id(), metrics.font_size(), ch);
        if let Some(glyph) = self.entries.get(&key) {
            self.hits += 1;
            return glyph.clone();
        }

        self.misses += 1;
        let path = metrics
            .source()
            .outline(metrics.glyph_id(ch), metrics.font_size());
        let ink = path.as_ref().and_then(Path::compute_tight_bounds);
        let glyph = Arc::new(GlyphPath { path, ink });
        if let Some((evicted, _)) = self.entries.push(key, glyph.clone()) {
            if evicted != key {
                trace!(ch = %evicted.ch, "evicted glyph outline");
            }
        }
        glyph
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SyntheticFace;

    fn metrics(size: f32) -> MetricsProvider {
        MetricsProvider::new(Arc::new(SyntheticFace::new()), size)
    }

    #[test]
    fn test_hit_returns_same_outline() {
        let mut cache = GlyphPathCache::new(8);
        let m = metrics(40.0);
        let first = cache.get_or_build(&m, '国');
        let second = cache.get_or_build(&m, '国');
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_size_is_part_of_key() {
        let mut cache = GlyphPathCache::new(8);
        let small = cache.get_or_build(&metrics(20.0), '国');
        let large = cache.get_or_build(&metrics(40.0), '国');
        let (s, l) = (small.ink.unwrap(), large.ink.unwrap());
        assert!((l.width() - 2.0 * s.width()).abs() < 1e-3);
    }

    #[test]
    fn test_eviction_is_bounded_and_transparent() {
        let mut cache = GlyphPathCache::new(2);
        let m = metrics(30.0);
        let before = cache.get_or_build(&m, 'a').ink;
        cache.get_or_build(&m, 'b');
        cache.get_or_build(&m, 'c');
        assert_eq!(cache.stats().len, 2);

        let after = cache.get_or_build(&m, 'a').ink;
        assert_eq!(before, after);
        assert_eq!(cache.stats().misses, 4);
    }

    #[test]
    fn test_blank_glyph() {
        let mut cache = GlyphPathCache::default();
        assert!(cache.get_or_build(&metrics(30.0), ' ').is_blank());
        assert_eq!(cache.stats().capacity, 512);
    }
}
