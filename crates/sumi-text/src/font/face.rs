use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use swash::scale::ScaleContext;
use swash::zeno::{Point, Verb};
use swash::{FontRef, Metrics};
use tiny_skia::{Path, PathBuilder};

use crate::font::{FontError, FontMetrics, Result};

/// Stable identity of a loaded face, used in cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u64);

/// Backend-neutral access to a face's metrics and glyph outlines.
///
/// Everything above the font layer (metrics, glyph cache, layout) talks to
/// faces through this trait, so in-memory faces can stand in for files.
pub trait GlyphSource: fmt::Debug + Send + Sync {
    /// Identity of this face. Equal ids must produce equal outlines.
    fn id(&self) -> FontId;

    /// Face metrics in font units.
    fn metrics(&self) -> FontMetrics;

    /// Glyph id mapped to `ch`, or `None` when the face has no glyph for it.
    fn glyph_id(&self, ch: char) -> Option<u16>;

    /// Horizontal advance of `glyph` in font units.
    fn advance_units(&self, glyph: u16) -> f32;

    /// Outline of `glyph` at `font_size` px per em.
    ///
    /// Coordinates are pixels with y pointing down and the origin on the
    /// baseline at the pen position. Blank glyphs return `None`.
    fn outline(&self, glyph: u16, font_size: f32) -> Option<Path>;
}

/// Loaded font face backed by a font file (TTF/OTF).
///
/// This is a thin wrapper around `swash::FontRef` that owns the
/// underlying font data.
#[derive(Debug, Clone)]
pub struct FontFace {
    /// Full font data.
    data: Arc<[u8]>,
    /// Offset to the table directory for this font.
    offset: u32,
    /// Cache key used internally by swash.
    key: swash::CacheKey,
    /// Extracted font metrics in font units.
    metrics: FontMetrics,
    id: FontId,
}

impl FontFace {
    /// Create a font face from raw bytes and a font index within the file.
    pub fn from_bytes(data: Arc<[u8]>, index: usize) -> Result<Self> {
        let font = FontRef::from_index(&data, index).ok_or(FontError::InvalidFont)?;
        let metrics = Self::metrics_from_swash(&font);
        let (offset, key) = (font.offset, font.key);
        let id = face_id(&data, index);
        Ok(Self {
            data,
            offset,
            key,
            metrics,
            id,
        })
    }

    /// Create a font face from raw bytes owned by a `Vec<u8>`.
    pub fn from_vec(data: Vec<u8>, index: usize) -> Result<Self> {
        Self::from_bytes(Arc::from(data), index)
    }

    /// Create a font face from a font file on disk.
    pub fn from_path(path: impl AsRef<std::path::Path>, index: usize) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_vec(data, index)
    }

    /// Return a transient `FontRef` for interacting with swash APIs.
    fn as_swash_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    fn metrics_from_swash(font: &FontRef<'_>) -> FontMetrics {
        // Use default (no variation) coordinates.
        let Metrics {
            units_per_em,
            ascent,
            descent,
            leading,
            ..
        } = font.metrics(&[]);

        FontMetrics {
            ascent,
            descent,
            line_gap: leading,
            units_per_em,
        }
    }
}

impl GlyphSource for FontFace {
    fn id(&self) -> FontId {
        self.id
    }

    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn glyph_id(&self, ch: char) -> Option<u16> {
        match self.as_swash_ref().charmap().map(ch) {
            0 => None,
            id => Some(id),
        }
    }

    fn advance_units(&self, glyph: u16) -> f32 {
        self.as_swash_ref().glyph_metrics(&[]).advance_width(glyph)
    }

    fn outline(&self, glyph: u16, font_size: f32) -> Option<Path> {
        let mut context = ScaleContext::new();
        let font = self.as_swash_ref();
        let mut scaler = context.builder(font).size(font_size).hint(false).build();
        let outline = scaler.scale_outline(glyph)?;
        outline_to_path(outline.points(), outline.verbs())
    }
}

/// Convert a y-up swash outline into a y-down tiny-skia path.
pub(crate) fn outline_to_path(points: &[Point], verbs: &[Verb]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    let mut cursor = 0;
    for verb in verbs {
        match verb {
            Verb::MoveTo => {
                let p = points.get(cursor)?;
                builder.move_to(p.x, -p.y);
                cursor += 1;
            }
            Verb::LineTo => {
                let p = points.get(cursor)?;
                builder.line_to(p.x, -p.y);
                cursor += 1;
            }
            Verb::QuadTo => {
                let (c, p) = (points.get(cursor)?, points.get(cursor + 1)?);
                builder.quad_to(c.x, -c.y, p.x, -p.y);
                cursor += 2;
            }
            Verb::CurveTo => {
                let (c1, c2, p) = (
                    points.get(cursor)?,
                    points.get(cursor + 1)?,
                    points.get(cursor + 2)?,
                );
                builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, p.x, -p.y);
                cursor += 3;
            }
            Verb::Close => builder.close(),
        }
    }
    builder.finish()
}

// Hashing the head of the file keeps loading cheap for large CJK faces.
fn face_id(data: &[u8], index: usize) -> FontId {
    let mut hasher = DefaultHasher::new();
    data.len().hash(&mut hasher);
    data[..data.len().min(64 * 1024)].hash(&mut hasher);
    index.hash(&mut hasher);
    FontId(hasher.finish())
}
