//! Glyph placement for horizontal and vertical writing.
//!
//! Layout produces positions in content coordinates: the origin is the
//! top-left corner of the tight content box and y grows downward. The
//! compositor maps content coordinates onto the canvas with a single
//! translation, so every decoration layer shares the same placements.

pub mod classify;
pub mod engine;

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tiny_skia::{Rect, Transform};

pub use classify::{GlyphClass, PlacementPolicy, Rotation, VerticalClassTable};
pub use engine::{LayoutEngine, LayoutParams};

/// Writing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Axis-aligned rectangle in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CellRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> [f32; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    /// Smallest rectangle covering both.
    pub fn union(self, other: CellRect) -> CellRect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        CellRect {
            x: left,
            y: top,
            width: self.right().max(other.right()) - left,
            height: self.bottom().max(other.bottom()) - top,
        }
    }
}

impl From<Rect> for CellRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x(),
            y: rect.y(),
            width: rect.width(),
            height: rect.height(),
        }
    }
}

/// Position of one glyph.
///
/// The glyph outline (origin on its baseline) is first moved by `offset`,
/// then rotated by `rotation`, then moved to `anchor`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    pub class: GlyphClass,
    /// Cell center in vertical mode, pen position on the baseline in
    /// horizontal mode.
    pub anchor: [f32; 2],
    pub rotation: Rotation,
    pub offset: [f32; 2],
    pub advance: f32,
    /// Cell reserved for the glyph.
    pub cell: CellRect,
    /// Line (horizontal) or column (vertical) index.
    pub line: usize,
}

impl GlyphPlacement {
    /// Glyph-space to content-space transform.
    pub fn transform(&self) -> Transform {
        Transform::from_translate(self.anchor[0], self.anchor[1])
            .pre_rotate(self.rotation.degrees())
            .pre_translate(self.offset[0], self.offset[1])
    }

    /// Glyph-space to canvas-space transform for a content box placed at `origin`.
    pub fn transform_at(&self, origin: [f32; 2]) -> Transform {
        self.transform().post_translate(origin[0], origin[1])
    }
}

/// Extent of one line or column.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    pub rect: CellRect,
    pub glyphs: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub orientation: Orientation,
    pub placements: Vec<GlyphPlacement>,
    pub lines: Vec<LineBox>,
    /// Tight content box size.
    pub width: f32,
    pub height: f32,
    /// Union of every glyph's placed ink bounds. May reach past the
    /// content box when outlines overhang their cells.
    pub ink: Option<CellRect>,
}

impl LayoutResult {
    /// Layout of zero lines.
    pub fn empty(orientation: Orientation) -> Self {
        Self {
            orientation,
            placements: Vec::new(),
            lines: Vec::new(),
            width: 0.0,
            height: 0.0,
            ink: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Extent of `count` items stacked `step` apart when each occupies `size`.
///
/// Covers both the sum of the steps and the last item's full size.
pub fn stacked_extent(count: usize, step: f32, size: f32) -> f32 {
    match count {
        0 => 0.0,
        n => (n - 1) as f32 * step + step.max(size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_stacked_extent() {
        assert_eq!(stacked_extent(0, 10.0, 8.0), 0.0);
        assert_eq!(stacked_extent(3, 10.0, 8.0), 30.0);
        // Negative spacing: last item still fully covered.
        assert_eq!(stacked_extent(3, 6.0, 8.0), 20.0);
    }

    #[test]
    fn test_rotated_transform_turns_clockwise() {
        let placement = GlyphPlacement {
            ch: 'ー',
            class: GlyphClass::RotatedInkCentered,
            anchor: [50.0, 50.0],
            rotation: Rotation::Quarter,
            offset: [0.0, 0.0],
            advance: 100.0,
            cell: CellRect::default(),
            line: 0,
        };
        let mut point = [tiny_skia::Point::from_xy(10.0, 0.0)];
        placement.transform().map_points(&mut point);
        assert!(approx_eq(point[0].x, 50.0));
        assert!(approx_eq(point[0].y, 60.0));
    }

    #[test]
    fn test_transform_at_adds_origin() {
        let placement = GlyphPlacement {
            ch: 'a',
            class: GlyphClass::Standard,
            anchor: [5.0, 7.0],
            rotation: Rotation::Upright,
            offset: [1.0, 1.0],
            advance: 10.0,
            cell: CellRect::default(),
            line: 0,
        };
        let ts = placement.transform_at([100.0, 200.0]);
        assert!(approx_eq(ts.tx, 106.0));
        assert!(approx_eq(ts.ty, 208.0));
    }

    #[test]
    fn test_cell_union() {
        let a = CellRect {
            x: 0.0,
            y: 10.0,
            width: 20.0,
            height: 5.0,
        };
        let b = CellRect {
            x: -4.0,
            y: 12.0,
            width: 10.0,
            height: 10.0,
        };
        let u = a.union(b);
        assert_eq!((u.x, u.y, u.right(), u.bottom()), (-4.0, 10.0, 20.0, 22.0));
    }

    #[test]
    fn test_orientation_serde() {
        let parsed: Orientation = serde_json::from_str("\"vertical\"").unwrap();
        assert_eq!(parsed, Orientation::Vertical);
    }
}
