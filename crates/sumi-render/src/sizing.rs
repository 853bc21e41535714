//! Canvas dimensions from the laid-out content box plus decoration bleed.
//!
//! Sizing never measures text itself: it takes the [`LayoutResult`] the
//! compositor will paint, so the canvas and the glyphs agree by construction.

use sumi_text::LayoutResult;

use crate::style::{Sides, StyleSpec};

/// Extra room around the content box, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Padding {
    pub fn uniform(value: f32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl std::ops::Add for Padding {
    type Output = Padding;

    fn add(self, rhs: Padding) -> Padding {
        Padding {
            left: self.left + rhs.left,
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
        }
    }
}

impl From<Sides> for Padding {
    fn from(sides: Sides) -> Self {
        Self {
            left: sides.left,
            top: sides.top,
            right: sides.right,
            bottom: sides.bottom,
        }
    }
}

/// Final canvas geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
    pub content_width: f32,
    pub content_height: f32,
    /// Sum of every bleed contribution.
    pub padding: Padding,
    /// Glyph ink reaching past the content box.
    pub overhang: Padding,
    pub shadow: Padding,
    pub outline: f32,
    pub border: f32,
    pub margins: Padding,
}

impl CanvasSize {
    /// Canvas position of the content box's top-left corner.
    pub fn content_origin(&self) -> [f32; 2] {
        [self.padding.left, self.padding.top]
    }
}

/// Overhang below this is float noise on ink that sits on a cell edge.
const INK_EPSILON: f32 = 1e-3;

/// How far placed glyph ink reaches past each edge of the content box.
pub fn ink_overhang(layout: &LayoutResult) -> Padding {
    let Some(ink) = layout.ink else {
        return Padding::default();
    };
    let beyond = |distance: f32| if distance > INK_EPSILON { distance } else { 0.0 };
    Padding {
        left: beyond(-ink.x),
        top: beyond(-ink.y),
        right: beyond(ink.right() - layout.width),
        bottom: beyond(ink.bottom() - layout.height),
    }
}

/// Room needed by the shadow on each side.
///
/// Blur spreads in every direction; the offset only pushes toward the side
/// it points at and pulls room away from the opposite side.
pub fn shadow_bleed(style: &StyleSpec) -> Padding {
    if !style.shadow_enabled || !style.text_visible {
        return Padding::default();
    }
    let [sx, sy] = style.shadow_offset_px();
    let blur = style.shadow_blur_radius();
    Padding {
        left: (blur - sx).max(0.0),
        top: (blur - sy).max(0.0),
        right: (sx + blur).max(0.0),
        bottom: (sy + blur).max(0.0),
    }
}

/// Widest `width + blur` over the visible outline layers.
pub fn outline_bleed(style: &StyleSpec) -> f32 {
    if !style.text_visible {
        return 0.0;
    }
    style
        .outline_layers()
        .iter()
        .filter(|layer| layer.is_visible())
        .map(|layer| layer.width + layer.blur_radius())
        .fold(0.0, f32::max)
}

/// Canvas for `layout` under `style`. Never smaller than 1x1.
///
/// Without glyphs only the margins and the background border take room.
pub fn canvas_size(style: &StyleSpec, layout: &LayoutResult) -> CanvasSize {
    let (shadow, outline) = if layout.is_empty() {
        (Padding::default(), 0.0)
    } else {
        (shadow_bleed(style), outline_bleed(style))
    };
    let overhang = ink_overhang(layout);
    let border = style.background_border_width();
    let margins = Padding::from(style.margins_px());
    let padding = overhang + margins + shadow + Padding::uniform(outline + border);

    let width = (layout.width + padding.horizontal()).ceil().max(1.0) as u32;
    let height = (layout.height + padding.vertical()).ceil().max(1.0) as u32;
    CanvasSize {
        width,
        height,
        content_width: layout.width,
        content_height: layout.height,
        padding,
        overhang,
        shadow,
        outline,
        border,
        margins,
    }
}
