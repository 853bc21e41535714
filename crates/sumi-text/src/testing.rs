//! Deterministic in-memory face for tests and benchmarks.
//!
//! Glyphs are rectangles whose position inside the em box depends on the
//! character kind, which is enough to observe placement without relying on
//! installed fonts.

use hashbrown::HashMap;
use tiny_skia::{Path, PathBuilder, Rect};

use crate::font::{FontId, FontMetrics, GlyphSource};

/// A face with 1000 units per em, ascent 800, descent 200 and line gap 90.
#[derive(Debug, Clone)]
pub struct SyntheticFace {
    id: FontId,
    metrics: FontMetrics,
    advances: HashMap<char, f32>,
    inks: HashMap<char, [f32; 4]>,
}

impl Default for SyntheticFace {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticFace {
    pub const UNITS_PER_EM: u16 = 1000;

    pub fn new() -> Self {
        Self {
            id: FontId(0x5359_4e54),
            metrics: FontMetrics {
                ascent: 800.0,
                descent: 200.0,
                line_gap: 90.0,
                units_per_em: Self::UNITS_PER_EM,
            },
            advances: HashMap::new(),
            inks: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = FontId(id);
        self
    }

    /// Override the advance of `ch`, in font units.
    pub fn with_advance(mut self, ch: char, units: f32) -> Self {
        self.advances.insert(ch, units);
        self
    }

    /// Override the ink rectangle of `ch` as `[left, top, right, bottom]` in
    /// font units, y down from the baseline. May reach outside the em box.
    pub fn with_ink(mut self, ch: char, ltrb: [f32; 4]) -> Self {
        self.inks.insert(ch, ltrb);
        self
    }

    pub fn with_metrics(mut self, ascent: f32, descent: f32, line_gap: f32) -> Self {
        self.metrics.ascent = ascent;
        self.metrics.descent = descent;
        self.metrics.line_gap = line_gap;
        self
    }

    fn default_advance(ch: char) -> f32 {
        if ch.is_ascii() { 500.0 } else { 1000.0 }
    }

    /// Ink rectangle in font units, y down from the baseline, as
    /// (left, top, right, bottom) fractions of the advance and absolute units.
    fn ink_units(&self, ch: char, advance: f32) -> Option<(f32, f32, f32, f32)> {
        if let Some(&[left, top, right, bottom]) = self.inks.get(&ch) {
            return Some((left, top, right, bottom));
        }
        if ch.is_whitespace() {
            return None;
        }
        let ink = match ch {
            '、' | '。' | '，' | '．' | ',' | '.' => {
                (0.1 * advance, -150.0, 0.35 * advance, 50.0)
            }
            'ー' | '－' | '-' | '—' | '‐' | '～' | '〜' => {
                (0.1 * advance, -320.0, 0.9 * advance, -260.0)
            }
            _ => (0.05 * advance, -750.0, 0.95 * advance, 100.0),
        };
        Some(ink)
    }
}

impl GlyphSource for SyntheticFace {
    fn id(&self) -> FontId {
        self.id
    }

    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn glyph_id(&self, ch: char) -> Option<u16> {
        u16::try_from(ch as u32).ok().filter(|id| *id != 0)
    }

    fn advance_units(&self, glyph: u16) -> f32 {
        match char::from_u32(glyph as u32) {
            Some(ch) => self
                .advances
                .get(&ch)
                .copied()
                .unwrap_or_else(|| Self::default_advance(ch)),
            None => 1000.0,
        }
    }

    fn outline(&self, glyph: u16, font_size: f32) -> Option<Path> {
        let ch = char::from_u32(glyph as u32)?;
        let (left, top, right, bottom) = self.ink_units(ch, self.advance_units(glyph))?;
        let scale = self.metrics.scale_factor(font_size);
        let rect = Rect::from_ltrb(left * scale, top * scale, right * scale, bottom * scale)?;
        Some(PathBuilder::from_rect(rect))
    }
}
