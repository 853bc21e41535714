/// Face-level metrics in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Ascent above baseline (positive).
    pub ascent: f32,
    /// Descent below baseline (positive).
    pub descent: f32,
    /// Line gap (leading).
    pub line_gap: f32,
    /// Units per em.
    pub units_per_em: u16,
}

impl FontMetrics {
    /// Ascent plus descent, without leading.
    pub fn cell_height(&self) -> f32 {
        self.ascent + self.descent
    }

    /// Ascent plus descent plus leading.
    pub fn line_height(&self) -> f32 {
        self.cell_height() + self.line_gap
    }

    /// Pixels per font unit at `font_size` px per em.
    pub fn scale_factor(&self, font_size: f32) -> f32 {
        if self.units_per_em != 0 {
            font_size / self.units_per_em as f32
        } else {
            1.0
        }
    }

    /// Scale metrics to pixel size, where `font_size` is in px per em.
    pub fn scale_to_pixels(&self, font_size: f32) -> ScaledFontMetrics {
        let scale = self.scale_factor(font_size);
        ScaledFontMetrics {
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            line_gap: self.line_gap * scale,
            font_size,
        }
    }
}

/// Scaled font metrics in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledFontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    pub font_size: f32,
}

impl ScaledFontMetrics {
    /// Snap ascent, descent and line gap to whole pixels.
    pub fn snapped(self) -> Self {
        Self {
            ascent: self.ascent.round(),
            descent: self.descent.round(),
            line_gap: self.line_gap.round(),
            font_size: self.font_size,
        }
    }
}
