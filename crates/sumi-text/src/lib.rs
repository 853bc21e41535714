//! sumi-text: fonts, metrics and glyph placement for the sumi renderer.
//!
//! - `font`: face loading (swash) and family resolution with fallback (fontdb)
//! - `metrics`: pixel-snapped metrics shared by layout, sizing and painting
//! - `glyph_cache`: LRU cache of glyph outlines keyed by (font, size, char)
//! - `layout`: horizontal and vertical placement with a per-character
//!   classification table for vertical punctuation

pub mod font;
pub mod glyph_cache;
pub mod layout;
pub mod metrics;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use font::{
    FontError, FontFace, FontId, FontLibrary, FontMetrics, GlyphSource, ResolvedFont,
    ScaledFontMetrics,
};
pub use glyph_cache::{CacheStats, GlyphKey, GlyphPath, GlyphPathCache};
pub use layout::{
    CellRect, GlyphClass, GlyphPlacement, LayoutEngine, LayoutParams, LayoutResult, LineBox,
    Orientation, PlacementPolicy, Rotation, VerticalClassTable,
};
pub use metrics::MetricsProvider;
