//! Memoized final bitmaps keyed by (style, content).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;
use sumi_text::CacheStats;
use tiny_skia::Pixmap;

use crate::error::Diagnostic;
use crate::sizing::CanvasSize;

/// Hashes of the serialized sanitized style and of the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub style: u64,
    pub content: u64,
}

impl RenderKey {
    pub fn new(style_json: &str, content: &str) -> Self {
        Self {
            style: hash_str(style_json),
            content: hash_str(content),
        }
    }
}

fn hash_str(value: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// A finished render.
#[derive(Debug, Clone)]
pub struct CachedRender {
    pub pixmap: Pixmap,
    pub canvas: CanvasSize,
    /// Diagnostics raised while rendering, excluding style sanitation.
    pub diagnostics: Vec<Diagnostic>,
}

struct Entry {
    style_json: String,
    content: String,
    render: CachedRender,
}

/// LRU cache of finished renders.
///
/// Keys are hashes, so a hit is confirmed against the stored style and
/// content before it is served.
pub struct RenderCache {
    entries: LruCache<RenderKey, Entry>,
    hits: u64,
    misses: u64,
}

impl std::fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("len", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl RenderCache {
    pub const DEFAULT_CAPACITY: usize = 32;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, style_json: &str, content: &str) -> Option<&CachedRender> {
        let key = RenderKey::new(style_json, content);
        match self.entries.get(&key) {
            Some(entry) if entry.style_json == style_json && entry.content == content => {
                self.hits += 1;
                Some(&entry.render)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, style_json: String, content: String, render: CachedRender) {
        let key = RenderKey::new(&style_json, &content);
        self.entries.put(
            key,
            Entry {
                style_json,
                content,
                render,
            },
        );
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
