//! Alpha-mask blur and its cache.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use sumi_text::CacheStats;
use tiny_skia::Mask;
use tracing::trace;

/// Blur `mask` in place so that coverage spreads at most `radius` pixels.
///
/// Three box passes per axis approximate a Gaussian. The box radii sum to
/// the rounded radius.
pub fn blur_mask(mask: &mut Mask, radius: f32) {
    let total = radius.max(0.0).round() as usize;
    if total == 0 {
        return;
    }
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let first = total / 3;
    let second = (total - first) / 2;
    let radii = [first, second, total - first - second];

    let mut scratch = vec![0u8; width.max(height)];
    let data = mask.data_mut();
    for r in radii.into_iter().filter(|r| *r > 0) {
        box_pass(data, &mut scratch, width, height, r, Axis::Horizontal);
        box_pass(data, &mut scratch, width, height, r, Axis::Vertical);
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

// Samples outside the mask count as zero coverage.
fn box_pass(
    data: &mut [u8],
    scratch: &mut [u8],
    width: usize,
    height: usize,
    radius: usize,
    axis: Axis,
) {
    let (lines, len) = match axis {
        Axis::Horizontal => (height, width),
        Axis::Vertical => (width, height),
    };
    if len == 0 {
        return;
    }
    let window = (2 * radius + 1) as u32;

    for line in 0..lines {
        let at = |i: usize| match axis {
            Axis::Horizontal => line * width + i,
            Axis::Vertical => i * width + line,
        };
        let mut sum: u32 = (0..=radius.min(len - 1)).map(|i| data[at(i)] as u32).sum();
        for (i, out) in scratch.iter_mut().take(len).enumerate() {
            *out = ((sum + window / 2) / window) as u8;
            if i + radius + 1 < len {
                sum += data[at(i + radius + 1)] as u32;
            }
            if i >= radius {
                sum -= data[at(i - radius)] as u32;
            }
        }
        for (i, value) in scratch.iter().take(len).enumerate() {
            data[at(i)] = *value;
        }
    }
}

/// Identity of a blur request: the source mask's fingerprint and the radius.
///
/// Color is applied after blurring, so it is not part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlurKey {
    pub source: u64,
    pub width: u32,
    pub height: u32,
    pub radius_bits: u32,
}

impl BlurKey {
    pub fn new(mask: &Mask, radius: f32) -> Self {
        let mut hasher = DefaultHasher::new();
        mask.data().hash(&mut hasher);
        Self {
            source: hasher.finish(),
            width: mask.width(),
            height: mask.height(),
            radius_bits: radius.to_bits(),
        }
    }
}

struct BlurEntry {
    source: Mask,
    blurred: Arc<Mask>,
}

/// LRU cache of blurred masks.
///
/// Entries keep their source mask and a hit is only served when the source
/// matches byte for byte.
pub struct BlurCache {
    entries: LruCache<BlurKey, BlurEntry>,
    hits: u64,
    misses: u64,
}

impl std::fmt::Debug for BlurCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlurCache")
            .field("len", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl Default for BlurCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl BlurCache {
    pub const DEFAULT_CAPACITY: usize = 32;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    /// `source` blurred by `radius`, from cache when possible.
    pub fn blurred(&mut self, source: &Mask, radius: f32) -> Arc<Mask> {
        let key = BlurKey::new(source, radius);
        if let Some(entry) = self.entries.get(&key) {
            if entry.source.data() == source.data() {
                self.hits += 1;
                return entry.blurred.clone();
            }
        }

        self.misses += 1;
        let mut blurred = source.clone();
        blur_mask(&mut blurred, radius);
        let blurred = Arc::new(blurred);
        trace!(radius, width = key.width, height = key.height, "blurred mask");
        self.entries.put(
            key,
            BlurEntry {
                source: source.clone(),
                blurred: blurred.clone(),
            },
        );
        blurred
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
