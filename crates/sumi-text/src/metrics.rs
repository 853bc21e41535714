//! Pixel metrics for one (face, size) pair.
//!
//! Layout, canvas sizing and the compositor all read geometry from a
//! [`MetricsProvider`]. Values are snapped to whole pixels so that cell
//! heights and advances sum without drift.

use std::sync::Arc;

use crate::font::{FontId, GlyphSource, ScaledFontMetrics};

#[derive(Debug, Clone)]
pub struct MetricsProvider {
    source: Arc<dyn GlyphSource>,
    scaled: ScaledFontMetrics,
    scale: f32,
}

impl MetricsProvider {
    pub fn new(source: Arc<dyn GlyphSource>, font_size: f32) -> Self {
        let metrics = source.metrics();
        let scaled = metrics.scale_to_pixels(font_size).snapped();
        let scale = metrics.scale_factor(font_size);
        Self {
            source,
            scaled,
            scale,
        }
    }

    pub fn source(&self) -> &Arc<dyn GlyphSource> {
        &self.source
    }

    pub fn font_id(&self) -> FontId {
        self.source.id()
    }

    pub fn font_size(&self) -> f32 {
        self.scaled.font_size
    }

    pub fn ascent(&self) -> f32 {
        self.scaled.ascent
    }

    pub fn descent(&self) -> f32 {
        self.scaled.descent
    }

    pub fn leading(&self) -> f32 {
        self.scaled.line_gap
    }

    /// Ascent plus descent. Never includes leading.
    pub fn cell_height(&self) -> f32 {
        (self.scaled.ascent + self.scaled.descent).max(1.0)
    }

    /// Glyph used for `ch`; missing characters map to `.notdef`.
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.source.glyph_id(ch).unwrap_or(0)
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.source.glyph_id(ch).is_some()
    }

    /// Advance width of `ch` in whole pixels.
    pub fn advance(&self, ch: char) -> f32 {
        (self.source.advance_units(self.glyph_id(ch)) * self.scale).round()
    }
}
